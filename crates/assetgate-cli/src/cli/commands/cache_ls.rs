//! `assetgate cache` – list cached assets.

use anyhow::Result;
use assetgate_core::cache::AssetCache;

pub async fn run_cache_ls(cache: &AssetCache) -> Result<()> {
    let entries = cache.list_paths().await?;
    if entries.is_empty() {
        println!("Cache is empty (namespace {}).", cache.namespace());
    } else {
        println!("{:<10} {:<28} {}", "SIZE", "CONTENT-TYPE", "PATH");
        for (path, content_type, size) in entries {
            println!("{size:<10} {content_type:<28} {path}");
        }
    }
    Ok(())
}
