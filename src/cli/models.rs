//! Model management CLI commands
//!
//! `thinkwell models` and `thinkwell stop`

use crate::app::{self, config::AppConfig};
use anyhow::{Context, Result};

/// List models available on the server
pub async fn list(config: &AppConfig) -> Result<()> {
    let client = app::build_client(config).await?;
    let models = client
        .list_models()
        .await
        .with_context(|| format!("Failed to list models at {}", config.ollama.host))?;

    println!("\n🦙 Models ({})\n", config.ollama.host);
    if models.is_empty() {
        println!("  No models installed. Pull one with `ollama pull qwen3`.");
        return Ok(());
    }

    let resolver = client.resolver();
    for model in &models {
        let rule = resolver
            .table()
            .find(&model.name)
            .map(|rule| rule.prefix.as_str())
            .unwrap_or("-");
        println!(
            "  {:32} {:>10}  rule: {}",
            model.name,
            format_size(model.size),
            rule
        );
    }
    println!();
    Ok(())
}

/// Unload a model from memory
pub async fn stop(config: &AppConfig, model: &str) -> Result<()> {
    let client = app::build_client(config).await?;
    let response = client
        .unload(model)
        .await
        .with_context(|| format!("Failed to unload {}", model))?;

    match response.done_reason.as_deref() {
        Some(reason) => println!("✅ {} stopped ({})", response.model, reason),
        None => println!("✅ {} stopped", response.model),
    }
    Ok(())
}

fn format_size(bytes: u64) -> String {
    const GB: f64 = 1024.0 * 1024.0 * 1024.0;
    const MB: f64 = 1024.0 * 1024.0;

    let bytes = bytes as f64;
    if bytes >= GB {
        format!("{:.1} GB", bytes / GB)
    } else {
        format!("{:.0} MB", bytes / MB)
    }
}
