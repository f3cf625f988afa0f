//! `assetgate show <path>` – print a cached asset's body.

use anyhow::Result;
use assetgate_core::cache::AssetCache;
use std::io::Write;

pub async fn run_show(cache: &AssetCache, path: &str) -> Result<()> {
    match cache.get(path).await? {
        Some(entry) => {
            tracing::debug!(%path, content_type = %entry.content_type, "cache hit");
            std::io::stdout().write_all(&entry.body)?;
        }
        None => println!("Not cached: {path}"),
    }
    Ok(())
}
