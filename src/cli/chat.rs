//! Chat CLI commands
//!
//! `thinkwell call` and `thinkwell stream`

use crate::app::{self, config::AppConfig};
use anyhow::{Context, Result};
use clap::Args;
use futures::StreamExt;
use serde_json::Value;
use std::io::Write;
use thinkwell_core::{ChatRequest, Message, ThinkSetting};

/// Arguments shared by `call` and `stream`
#[derive(Args, Debug)]
pub struct ChatArgs {
    /// Model identifier (e.g. qwen3:8b)
    pub model: String,

    /// Prompt text
    pub prompt: String,

    /// System message placed before the prompt
    #[arg(long, short = 's')]
    pub system: Option<String>,

    /// Reasoning request: true, false, low, medium or high (default: on for `stream`, off for `call`)
    #[arg(long, short = 't')]
    pub think: Option<ThinkSetting>,

    /// Output format: `json` or a JSON schema
    #[arg(long, value_parser = parse_format)]
    pub format: Option<Value>,

    /// Model option as key=value (repeatable)
    #[arg(long = "option", short = 'o', value_parser = parse_option)]
    pub options: Vec<(String, Value)>,

    /// How long the model stays loaded (e.g. 5m, 0)
    #[arg(long)]
    pub keep_alive: Option<String>,

    /// Print responses as JSON
    #[arg(long)]
    pub json: bool,
}

impl ChatArgs {
    /// Build the chat request these arguments describe
    pub fn to_request(&self) -> ChatRequest {
        let mut messages = Vec::new();
        if let Some(system) = &self.system {
            messages.push(Message::system(system));
        }
        messages.push(Message::user(&self.prompt));

        let mut request = ChatRequest::new(&self.model).with_messages(messages);
        if let Some(think) = self.think {
            request = request.with_think(think);
        }
        if let Some(format) = &self.format {
            request = request.with_format(format.clone());
        }
        if !self.options.is_empty() {
            let options: serde_json::Map<String, Value> = self.options.iter().cloned().collect();
            request = request.with_options(Value::Object(options));
        }
        if let Some(keep_alive) = &self.keep_alive {
            request = request.with_keep_alive(scalar(keep_alive));
        }
        request
    }
}

/// Parse `json` or an inline JSON schema
fn parse_format(s: &str) -> Result<Value, String> {
    if s == "json" {
        return Ok(Value::String(s.to_string()));
    }
    serde_json::from_str(s).map_err(|e| format!("format must be `json` or a JSON schema: {e}"))
}

/// Parse a `key=value` model option
fn parse_option(s: &str) -> Result<(String, Value), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got `{s}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing option name in `{s}`"));
    }
    Ok((key.to_string(), scalar(value.trim())))
}

/// Numbers and booleans as JSON scalars, anything else as a string
fn scalar(s: &str) -> Value {
    serde_json::from_str::<Value>(s)
        .ok()
        .filter(|v| v.is_number() || v.is_boolean())
        .unwrap_or_else(|| Value::String(s.to_string()))
}

/// Send a prompt and print the whole response
pub async fn call(config: &AppConfig, args: ChatArgs) -> Result<()> {
    let client = app::build_client(config).await?;
    let request = args.to_request();

    let response = client
        .call(&request, config.cache.enabled)
        .await
        .with_context(|| format!("Chat with {} failed", request.model))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&response.to_json()?)?);
        return Ok(());
    }

    if !response.reasoning().trim().is_empty() {
        println!("\n💭 Thinking\n");
        println!("{}", response.reasoning().trim());
        println!("\n💬 Answer\n");
    }
    println!("{}", response.content().trim());

    Ok(())
}

/// Send a prompt and print fragments as they arrive
pub async fn stream(config: &AppConfig, args: ChatArgs) -> Result<()> {
    let client = app::build_client(config).await?;
    let request = args.to_request();

    let mut chunks = client
        .stream(&request, config.cache.enabled)
        .await
        .with_context(|| format!("Chat with {} failed", request.model))?;

    let mut stdout = std::io::stdout();
    let mut section = Section::None;

    while let Some(chunk) = chunks.next().await {
        let chunk = chunk?;

        if args.json {
            println!("{}", serde_json::to_string(&chunk.to_json()?)?);
            continue;
        }

        let (reasoning, content) = chunk.parts();
        if !reasoning.is_empty() {
            if section != Section::Thinking {
                write!(stdout, "\n💭 Thinking\n\n")?;
                section = Section::Thinking;
            }
            write!(stdout, "{}", reasoning)?;
        }
        if !content.is_empty() {
            if section == Section::Thinking {
                write!(stdout, "\n\n💬 Answer\n\n")?;
            }
            section = Section::Answer;
            write!(stdout, "{}", content)?;
        }
        stdout.flush()?;
    }

    if !args.json {
        writeln!(stdout)?;
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Thinking,
    Answer,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use serde_json::json;
    use thinkwell_core::{MessageRole, ThinkLevel};

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: ChatArgs,
    }

    fn parse(argv: &[&str]) -> ChatArgs {
        let mut full = vec!["thinkwell"];
        full.extend_from_slice(argv);
        TestCli::parse_from(full).args
    }

    #[test]
    fn test_minimal_request() {
        let request = parse(&["qwen3:8b", "Why is the sky blue?"]).to_request();

        assert_eq!(request.model, "qwen3:8b");
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, MessageRole::User);
        assert_eq!(request.messages[0].content, "Why is the sky blue?");
        assert_eq!(request.think, None);
        assert_eq!(request.options, None);
    }

    #[test]
    fn test_full_request() {
        let request = parse(&[
            "granite3.3:8b",
            "hi",
            "--system",
            "Be brief.",
            "--think",
            "medium",
            "--format",
            "json",
            "-o",
            "temperature=0.2",
            "-o",
            "num_ctx=8192",
            "-o",
            "stop=END",
            "--keep-alive",
            "0",
        ])
        .to_request();

        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, MessageRole::System);
        assert_eq!(request.messages[0].content, "Be brief.");
        assert_eq!(request.think, Some(ThinkSetting::Level(ThinkLevel::Medium)));
        assert_eq!(request.format, Some(json!("json")));
        assert_eq!(
            request.options,
            Some(json!({"temperature": 0.2, "num_ctx": 8192, "stop": "END"}))
        );
        assert_eq!(request.keep_alive, Some(json!(0)));
    }

    #[test]
    fn test_parse_format_schema() {
        let schema = parse_format(r#"{"type":"object"}"#).unwrap();
        assert_eq!(schema, json!({"type": "object"}));
        assert!(parse_format("yaml").is_err());
    }

    #[test]
    fn test_parse_option_errors() {
        assert!(parse_option("temperature").is_err());
        assert!(parse_option("=1").is_err());
        assert_eq!(
            parse_option("seed = 42").unwrap(),
            ("seed".to_string(), json!(42))
        );
    }

    #[test]
    fn test_scalar() {
        assert_eq!(scalar("true"), json!(true));
        assert_eq!(scalar("1.5"), json!(1.5));
        assert_eq!(scalar("5m"), json!("5m"));
        assert_eq!(scalar("\"quoted\""), json!("\"quoted\""));
    }
}
