//! Cache CLI commands
//!
//! `thinkwell cache` - Manage the response cache

use super::CacheCommands;
use crate::app::config::AppConfig;
use anyhow::{Context, Result};
use thinkwell_llm::ResponseCache;

/// Run cache command
pub async fn run(config: &AppConfig, cmd: CacheCommands) -> Result<()> {
    let cache = ResponseCache::new(config.cache_dir());
    match cmd {
        CacheCommands::Clear => {
            let removed = cache
                .clear()
                .await
                .with_context(|| format!("Failed to clear {}", cache.dir().display()))?;
            println!("🧹 Removed {} cached responses", removed);
        }
        CacheCommands::Path => {
            println!("{}", cache.dir().display());
            if !config.cache.enabled {
                println!("(caching is disabled)");
            }
        }
    }
    Ok(())
}
