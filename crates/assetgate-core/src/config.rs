use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// How the gateway answers a local request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Suspend the request and race the companion reply against the timeout.
    #[default]
    Race,
    /// Serve from cache on hit; on miss fall back to a direct network fetch
    /// while asking the companion to populate the cache for next time.
    Cachefirst,
}

/// Global configuration loaded from `~/.config/assetgate/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// How long a local request waits for the companion before a synthesized
    /// timeout response, in milliseconds.
    pub timeout_ms: u64,
    /// Strategy for local requests: "race" (default) or "cachefirst".
    #[serde(default)]
    pub strategy: Strategy,
    /// Cache namespace; bump to wholesale-invalidate persisted assets.
    #[serde(default = "default_namespace")]
    pub cache_namespace: String,
    /// Extra path prefixes excluded from interception, on top of built-ins.
    #[serde(default)]
    pub extra_exclude_prefixes: Vec<String>,
    /// Extra path substrings excluded from interception, on top of built-ins.
    #[serde(default)]
    pub extra_exclude_substrings: Vec<String>,
}

fn default_namespace() -> String {
    crate::cache::DEFAULT_NAMESPACE.to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            strategy: Strategy::Race,
            cache_namespace: default_namespace(),
            extra_exclude_prefixes: Vec::new(),
            extra_exclude_substrings: Vec::new(),
        }
    }
}

impl GatewayConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("assetgate")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<GatewayConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = GatewayConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: GatewayConfig = toml::from_str(&data)?;
    Ok(cfg)
}
