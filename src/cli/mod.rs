//! CLI module for Thinkwell
//!
//! Provides commands:
//! - `call` / `stream`: chat with a model, reasoning split from the answer
//! - `rules`: inspect the model rule table
//! - `models` / `stop`: list and unload models on the server
//! - `cache`: manage the response cache

use crate::app::config::AppConfig;
use clap::{Args, Parser, Subcommand};
use thinkwell_core::ThinkSetting;

pub mod cache;
pub mod chat;
pub mod models;
pub mod rules;

/// Thinkwell CLI
#[derive(Parser, Debug)]
#[command(name = "thinkwell")]
#[command(about = "Reasoning-aware chat for local Ollama models")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Overrides applied on top of the loaded configuration
#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    /// Ollama server address
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Model rule file
    #[arg(long, global = true)]
    pub rules: Option<String>,

    /// Disable the response cache
    #[arg(long, global = true)]
    pub no_cache: bool,
}

impl GlobalArgs {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(host) = &self.host {
            config.ollama.host = host.clone();
        }
        if let Some(rules) = &self.rules {
            config.rules.path = rules.clone();
        }
        if self.no_cache {
            config.cache.enabled = false;
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send a prompt and print the reasoning and the answer
    Call(chat::ChatArgs),
    /// Send a prompt and print the reply as it arrives
    Stream(chat::ChatArgs),
    /// Show the model rule table, or the behavior resolved for one model
    Rules {
        /// Model identifier to resolve
        model: Option<String>,
        /// Reasoning request to resolve with (true, false, low, medium, high)
        #[arg(long, short = 't')]
        think: Option<ThinkSetting>,
    },
    /// List models available on the server
    Models,
    /// Unload a model from memory
    Stop {
        /// Model identifier
        model: String,
    },
    /// Manage the response cache
    #[command(subcommand)]
    Cache(CacheCommands),
}

#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Delete every cached response
    Clear,
    /// Show where responses are cached
    Path,
}

/// Run the CLI command
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let Some(command) = cli.command else {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        cmd.print_help()?;
        println!();
        return Ok(());
    };

    let mut config = crate::app::loader::load_config()?;
    cli.global.apply(&mut config);

    match command {
        Commands::Call(args) => chat::call(&config, args).await,
        Commands::Stream(args) => chat::stream(&config, args).await,
        Commands::Rules { model, think } => rules::run(&config, model.as_deref(), think),
        Commands::Models => models::list(&config).await,
        Commands::Stop { model } => models::stop(&config, &model).await,
        Commands::Cache(cmd) => cache::run(&config, cmd).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::config::{CacheSettings, OllamaSettings, RulesSettings};

    fn base_config() -> AppConfig {
        AppConfig {
            ollama: OllamaSettings {
                host: "http://localhost:11434".to_string(),
                timeout_secs: 300,
            },
            cache: CacheSettings::default(),
            rules: RulesSettings::default(),
        }
    }

    #[test]
    fn test_global_args_override_config() {
        let cli = Cli::parse_from([
            "thinkwell",
            "--host",
            "gpu-box:9000",
            "--no-cache",
            "--rules",
            "my-rules.yaml",
            "models",
        ]);
        let mut config = base_config();
        cli.global.apply(&mut config);

        assert_eq!(config.ollama.host, "gpu-box:9000");
        assert_eq!(config.rules.path, "my-rules.yaml");
        assert!(!config.cache.enabled);
        assert!(matches!(cli.command, Some(Commands::Models)));
    }

    #[test]
    fn test_global_args_default_keeps_config() {
        let mut config = base_config();
        GlobalArgs::default().apply(&mut config);

        assert_eq!(config.ollama.host, "http://localhost:11434");
        assert!(config.cache.enabled);
    }

    #[test]
    fn test_rules_command_parses_think() {
        let cli = Cli::parse_from(["thinkwell", "rules", "qwen3:8b", "--think", "high"]);
        match cli.command {
            Some(Commands::Rules { model, think }) => {
                assert_eq!(model.as_deref(), Some("qwen3:8b"));
                assert_eq!(think, Some(ThinkSetting::Level(thinkwell_core::ThinkLevel::High)));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
