//! `assetgate probe <url>` – fetch a URL through the network backend.

use anyhow::{Context, Result};
use assetgate_core::network::{CurlBackend, NetworkBackend};

pub async fn run_probe(url: &str) -> Result<()> {
    let backend = CurlBackend::default();
    let url_owned = url.to_string();
    let response = tokio::task::spawn_blocking(move || backend.fetch(&url_owned))
        .await
        .context("probe task panicked")?
        .with_context(|| format!("fetch failed: {url}"))?;

    println!(
        "{} ({} bytes, content-type {})",
        url,
        response.body.len(),
        response.content_type
    );
    Ok(())
}
