//! CLI command handlers. Each command is in its own file for clarity.

mod cache_ls;
mod classify;
mod probe;
mod purge;
mod show;

pub use cache_ls::run_cache_ls;
pub use classify::run_classify;
pub use probe::run_probe;
pub use purge::run_purge;
pub use show::run_show;
