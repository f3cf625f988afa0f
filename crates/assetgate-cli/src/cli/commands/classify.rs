//! `assetgate classify <url> [--referrer <url>]` – dry-run the classifier.

use anyhow::Result;
use assetgate_core::classifier::{classify, Classification, ExclusionRules, RequestMeta};
use assetgate_core::config::GatewayConfig;

pub fn run_classify(cfg: &GatewayConfig, url: &str, referrer: Option<String>) -> Result<()> {
    let rules = ExclusionRules::with_extras(
        &cfg.extra_exclude_prefixes,
        &cfg.extra_exclude_substrings,
    );
    let meta = RequestMeta::new(url, referrer);
    match classify(&meta, &rules) {
        Classification::Local => println!("local"),
        Classification::Passthrough => println!("passthrough"),
    }
    Ok(())
}
