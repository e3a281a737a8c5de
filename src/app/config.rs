//! Application configuration types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thinkwell_llm::{OllamaConfig, ResponseCache};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub ollama: OllamaSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub rules: RulesSettings,
}

/// Model server connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaSettings {
    pub host: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Response cache
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub dir: Option<String>,
    #[serde(default)]
    pub clear_on_start: bool,
}

/// Model rule table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesSettings {
    #[serde(default = "default_rules_path")]
    pub path: String,
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_true() -> bool {
    true
}

fn default_rules_path() -> String {
    "config/rules.yaml".to_string()
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: None,
            clear_on_start: false,
        }
    }
}

impl Default for RulesSettings {
    fn default() -> Self {
        Self {
            path: default_rules_path(),
        }
    }
}

impl AppConfig {
    /// Transport configuration
    pub fn ollama_config(&self) -> OllamaConfig {
        OllamaConfig::new()
            .with_base_url(&self.ollama.host)
            .with_timeout(Duration::from_secs(self.ollama.timeout_secs))
    }

    /// Cache directory, falling back to the platform cache directory
    pub fn cache_dir(&self) -> PathBuf {
        self.cache
            .dir
            .as_deref()
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(ResponseCache::default_dir)
    }
}
