//! `assetgate purge` – drop every cached asset in the namespace.

use anyhow::Result;
use assetgate_core::cache::AssetCache;

pub async fn run_purge(cache: &AssetCache) -> Result<()> {
    let removed = cache.purge().await?;
    println!("Removed {removed} cached asset(s) from namespace {}.", cache.namespace());
    Ok(())
}
