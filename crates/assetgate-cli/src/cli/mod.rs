//! CLI for the assetgate interception gateway.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use assetgate_core::cache::AssetCache;
use assetgate_core::config;

use commands::{run_cache_ls, run_classify, run_probe, run_purge, run_show};

/// Top-level CLI for the assetgate gateway.
#[derive(Debug, Parser)]
#[command(name = "assetgate")]
#[command(about = "assetgate: request interception gateway tooling", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Classify a URL as local (intercepted) or passthrough.
    Classify {
        /// Full request URL.
        url: String,

        /// Referrer URL, if any.
        #[arg(long)]
        referrer: Option<String>,
    },

    /// List cached assets in the configured namespace.
    Cache,

    /// Print a cached asset's body to stdout.
    Show {
        /// Cache key (path+query, e.g. "/db/table.csv").
        path: String,
    },

    /// Remove every cached asset in the configured namespace.
    Purge,

    /// Fetch a URL through the passthrough network backend.
    Probe {
        /// Direct HTTP/HTTPS URL to fetch.
        url: String,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Classify { url, referrer } => run_classify(&cfg, &url, referrer)?,
            CliCommand::Cache => {
                let cache = AssetCache::open_default(&cfg.cache_namespace).await?;
                run_cache_ls(&cache).await?;
            }
            CliCommand::Show { path } => {
                let cache = AssetCache::open_default(&cfg.cache_namespace).await?;
                run_show(&cache, &path).await?;
            }
            CliCommand::Purge => {
                let cache = AssetCache::open_default(&cfg.cache_namespace).await?;
                run_purge(&cache).await?;
            }
            CliCommand::Probe { url } => run_probe(&url).await?,
        }

        Ok(())
    }
}
