//! Application wiring
//!
//! Turns configuration into a rule table and a ready-to-use client.

pub mod config;
pub mod loader;

use self::config::AppConfig;
use anyhow::{Context, Result};
use std::sync::Arc;
use thinkwell_core::{RuleLoader, RuleResolver, RuleTable};
use thinkwell_llm::{OllamaTransport, ResponseCache, ThinkClient};
use tracing::{debug, info};

/// Load the configured rule table
pub fn load_rules(config: &AppConfig) -> Result<RuleTable> {
    RuleLoader::with_path(&config.rules.path)
        .load()
        .with_context(|| format!("Failed to load model rules from {}", config.rules.path))
}

/// Build the client from configuration
pub async fn build_client(config: &AppConfig) -> Result<ThinkClient> {
    let transport =
        OllamaTransport::new(config.ollama_config()).context("Failed to create Ollama transport")?;
    debug!("Using Ollama at {}", transport.base_url());

    let resolver = RuleResolver::new(load_rules(config)?);
    let mut client = ThinkClient::new(Arc::new(transport), resolver);

    if config.cache.enabled {
        let cache = ResponseCache::new(config.cache_dir());
        if config.cache.clear_on_start {
            let removed = cache.clear().await.context("Failed to clear response cache")?;
            info!("Cleared {} cached responses", removed);
        }
        client = client.with_cache(cache);
    }

    Ok(client)
}
