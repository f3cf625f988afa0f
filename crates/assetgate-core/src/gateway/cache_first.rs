//! Cache-first strategy: serve from the durable cache, fall back to the
//! network, and let the companion populate the cache for next time.

use anyhow::Result;

use crate::asset::{AssetResponse, ResponseOrigin};
use crate::gateway::{Gateway, InterceptedRequest};
use crate::url_model::full_url_to_path;

impl Gateway {
    /// On hit, the cached entry answers immediately. On miss the companion is
    /// nudged (no correlation id; the eventual reply only populates the
    /// cache) and the current request is answered by a direct network fetch.
    pub(super) async fn handle_cache_first(
        &self,
        request: &InterceptedRequest,
    ) -> Result<AssetResponse> {
        let path =
            full_url_to_path(&request.meta.url).unwrap_or_else(|| request.meta.url.clone());

        if let Some(entry) = self.cache.get(&path).await? {
            tracing::debug!(%path, "cache hit");
            return Ok(AssetResponse::new(
                entry.body,
                entry.content_type,
                ResponseOrigin::Cache,
            ));
        }

        tracing::debug!(%path, "cache miss, network fallback");
        self.notify_companion(request, None);
        self.fetch_network(&request.meta.url).await
    }
}
