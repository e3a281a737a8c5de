//! Rules CLI command
//!
//! `thinkwell rules [MODEL]` - Inspect the model rule table

use crate::app::{self, config::AppConfig};
use anyhow::Result;
use thinkwell_core::{Rule, RuleResolver, RuleTable, ThinkSetting};

/// Run rules command
pub fn run(config: &AppConfig, model: Option<&str>, think: Option<ThinkSetting>) -> Result<()> {
    let table = app::load_rules(config)?;
    match model {
        Some(model) => resolve(table, model, think),
        None => {
            list(&table, &config.rules.path);
            Ok(())
        }
    }
}

/// Print every rule in lookup order
fn list(table: &RuleTable, path: &str) {
    println!("\n📐 Model rules ({})\n", path);

    if table.is_empty() {
        println!("  No model rules. Every model uses the default rule.");
    }
    for rule in table.rules() {
        print_rule(&rule.prefix, rule);
    }
    print_rule("(default)", table.default_rule());
    println!();
}

fn print_rule(name: &str, rule: &Rule) {
    let flag = if rule.force_disable_flag {
        "think forced off"
    } else {
        "think passed through"
    };
    println!("  {:22} {}", name, flag);

    if let Some(message) = &rule.injected_message {
        println!(
            "  {:22} + {} message ({:?}): {:?}",
            "",
            message.role.as_str(),
            message.position,
            message.content
        );
    }
    for (i, pattern) in rule.patterns.iter().enumerate() {
        println!("  {:22} [{}] {}", "", i, pattern.as_str());
    }
    if rule.patterns.len() > 1 {
        println!("  {:22} streaming uses {}", "", rule.stream_pattern);
    }
}

/// Print the behavior one model resolves to
fn resolve(table: RuleTable, model: &str, think: Option<ThinkSetting>) -> Result<()> {
    let requested = think.unwrap_or(ThinkSetting::OFF);
    let effective = RuleResolver::new(table).resolve(model, requested);

    match &effective.matched_prefix {
        Some(prefix) => println!("\n📐 {} matches rule '{}'", model, prefix),
        None => println!("\n📐 {} uses the default rule", model),
    }
    if effective.send_reasoning_flag != requested {
        println!(
            "   ⚠️  think={} is overridden to think={}",
            requested, effective.send_reasoning_flag
        );
    }
    println!();
    println!("{}", serde_json::to_string_pretty(&effective)?);
    Ok(())
}
