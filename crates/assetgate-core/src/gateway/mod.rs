//! Interception gateway: the orchestrator in the request path.
//!
//! For each intercepted request: classify, then either forward verbatim to
//! the network or answer it locally with the configured strategy (race or
//! cache-first). Companion replies enter through
//! [`Gateway::handle_companion_message`] regardless of strategy.

mod cache_first;
mod race;

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;

use crate::asset::{AssetResponse, ResponseOrigin};
use crate::broker::{ContextBroker, ContextId};
use crate::cache::{AssetCache, CacheEntry};
use crate::channel::{parse_inbound, InboundMessage, NeedResource};
use crate::classifier::{classify, Classification, ExclusionRules, RequestMeta};
use crate::config::{GatewayConfig, Strategy};
use crate::network::NetworkBackend;
use crate::registry::{CorrelationId, CorrelationRegistry};

/// One outgoing request handed to the gateway by the host environment.
#[derive(Debug, Clone)]
pub struct InterceptedRequest {
    pub meta: RequestMeta,
    /// The document context that owns this request, when the host knows it.
    /// `None` (e.g. cross-context) means companion notices are skipped and
    /// local requests fall through to the strategy's default answer.
    pub context: Option<ContextId>,
}

impl InterceptedRequest {
    pub fn new(meta: RequestMeta, context: Option<ContextId>) -> Self {
        InterceptedRequest { meta, context }
    }
}

/// The interception controller. One instance per intercepting context; owns
/// its correlation registry for that lifetime, so independent gateways (e.g.
/// under test) never share slots.
pub struct Gateway {
    registry: CorrelationRegistry,
    broker: Arc<ContextBroker>,
    cache: AssetCache,
    network: Arc<dyn NetworkBackend>,
    rules: ExclusionRules,
    strategy: Strategy,
    timeout: Duration,
}

impl Gateway {
    pub fn new(
        cfg: &GatewayConfig,
        cache: AssetCache,
        broker: Arc<ContextBroker>,
        network: Arc<dyn NetworkBackend>,
    ) -> Self {
        Gateway {
            registry: CorrelationRegistry::new(),
            broker,
            cache,
            network,
            rules: ExclusionRules::with_extras(
                &cfg.extra_exclude_prefixes,
                &cfg.extra_exclude_substrings,
            ),
            strategy: cfg.strategy,
            timeout: cfg.timeout(),
        }
    }

    /// Answer one intercepted request. Suspends the logical request (not the
    /// runtime) until an answer exists; always produces *a* response for
    /// local requests — companion bytes, cache hit, network fallback, or the
    /// synthesized timeout text.
    pub async fn handle(&self, request: InterceptedRequest) -> Result<AssetResponse> {
        match classify(&request.meta, &self.rules) {
            Classification::Passthrough => {
                tracing::debug!(url = %request.meta.url, "passthrough");
                self.fetch_network(&request.meta.url).await
            }
            Classification::Local => match self.strategy {
                Strategy::Race => self.handle_race(&request).await,
                Strategy::Cachefirst => self.handle_cache_first(&request).await,
            },
        }
    }

    /// Intake for companion replies (relayed by a document context).
    ///
    /// Malformed input is logged and dropped. Well-formed replies always
    /// write through to the cache under their path; when a requestId names a
    /// still-pending slot, that request is resolved too. A reply for an
    /// already-settled slot is an expected race outcome and is ignored.
    pub async fn handle_companion_message(&self, raw: &str) {
        let msg = match parse_inbound(raw) {
            InboundMessage::Fulfillment(msg) => msg,
            InboundMessage::Malformed { reason } => {
                tracing::warn!(%reason, "dropping malformed companion message");
                return;
            }
        };

        let entry = CacheEntry {
            body: msg.asset_content.as_bytes().to_vec(),
            content_type: msg.content_type.clone(),
        };
        if let Err(err) = self.cache.put(&msg.asset_url, &entry).await {
            tracing::warn!(path = %msg.asset_url, error = %err, "cache write failed");
        }

        if let Some(id) = msg.request_id {
            let response = AssetResponse::new(
                msg.asset_content.into_bytes(),
                msg.content_type,
                ResponseOrigin::Companion,
            );
            if !self.registry.resolve(id, response) {
                tracing::debug!(id, "reply for already-settled request ignored");
            }
        }
    }

    /// Direct fetch through the blocking network backend.
    async fn fetch_network(&self, url: &str) -> Result<AssetResponse> {
        let network = Arc::clone(&self.network);
        let url = url.to_string();
        let fetch_url = url.clone();
        let response = tokio::task::spawn_blocking(move || network.fetch(&fetch_url))
            .await
            .context("network fetch task panicked")?
            .with_context(|| format!("network fetch failed: {url}"))?;
        Ok(response)
    }

    /// Best-effort notice to the companion via the request's owning context.
    /// Returns whether delivery was handed off.
    fn notify_companion(
        &self,
        request: &InterceptedRequest,
        request_id: Option<CorrelationId>,
    ) -> bool {
        let Some(context) = request.context else {
            tracing::debug!(url = %request.meta.url, "request has no owning context, notice skipped");
            return false;
        };
        self.broker
            .notify(context, NeedResource::new(request.meta.url.clone(), request_id))
    }

    /// Registry accessor for inspection in tests.
    pub fn registry(&self) -> &CorrelationRegistry {
        &self.registry
    }

    /// Cache accessor (shared handle).
    pub fn cache(&self) -> &AssetCache {
        &self.cache
    }
}

#[cfg(test)]
mod tests;
