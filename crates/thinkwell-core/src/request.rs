//! Chat request payload
//!
//! The transport-neutral request that rule shaping operates on. Field names
//! follow the Ollama chat API so the serialized form doubles as the cache
//! fingerprint input.

use crate::message::Message;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Graded reasoning effort for models that accept one
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThinkLevel {
    /// Low effort
    Low,
    /// Medium effort
    Medium,
    /// High effort
    High,
}

/// The caller's request for reasoning output: a plain switch or a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ThinkSetting {
    /// Reasoning on or off
    Enabled(bool),
    /// Reasoning at a given effort
    Level(ThinkLevel),
}

impl ThinkSetting {
    /// Reasoning explicitly off
    pub const OFF: Self = Self::Enabled(false);

    /// Whether this setting asks for any reasoning at all
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::Enabled(false))
    }
}

impl Default for ThinkSetting {
    fn default() -> Self {
        Self::OFF
    }
}

impl From<bool> for ThinkSetting {
    fn from(value: bool) -> Self {
        Self::Enabled(value)
    }
}

impl From<ThinkLevel> for ThinkSetting {
    fn from(value: ThinkLevel) -> Self {
        Self::Level(value)
    }
}

impl FromStr for ThinkSetting {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "true" | "on" | "yes" => Ok(Self::Enabled(true)),
            "false" | "off" | "no" => Ok(Self::Enabled(false)),
            "low" => Ok(Self::Level(ThinkLevel::Low)),
            "medium" => Ok(Self::Level(ThinkLevel::Medium)),
            "high" => Ok(Self::Level(ThinkLevel::High)),
            other => Err(format!(
                "invalid think setting '{}': expected true, false, low, medium or high",
                other
            )),
        }
    }
}

impl std::fmt::Display for ThinkSetting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Enabled(value) => write!(f, "{}", value),
            Self::Level(ThinkLevel::Low) => f.write_str("low"),
            Self::Level(ThinkLevel::Medium) => f.write_str("medium"),
            Self::Level(ThinkLevel::High) => f.write_str("high"),
        }
    }
}

/// Chat request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model identifier (`name:tag`)
    pub model: String,
    /// Messages in the conversation
    pub messages: Vec<Message>,
    /// Whether the response is streamed
    #[serde(default)]
    pub stream: bool,
    /// Reasoning flag sent to the provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub think: Option<ThinkSetting>,
    /// Output format: `"json"` or a JSON schema
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<serde_json::Value>,
    /// Model parameters (`temperature`, `num_ctx`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<serde_json::Value>,
    /// How long the model stays loaded after the request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_alive: Option<serde_json::Value>,
    /// Tool definitions the model may call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<serde_json::Value>>,
}

impl ChatRequest {
    /// Create a new chat request
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Add a single user prompt
    #[must_use]
    pub fn with_prompt(self, prompt: impl Into<String>) -> Self {
        self.with_message(Message::user(prompt))
    }

    /// Add a message
    #[must_use]
    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Add messages
    #[must_use]
    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages.extend(messages);
        self
    }

    /// Set the reasoning flag
    #[must_use]
    pub fn with_think(mut self, think: impl Into<ThinkSetting>) -> Self {
        self.think = Some(think.into());
        self
    }

    /// Set the output format
    #[must_use]
    pub fn with_format(mut self, format: serde_json::Value) -> Self {
        self.format = Some(format);
        self
    }

    /// Set model options
    #[must_use]
    pub fn with_options(mut self, options: serde_json::Value) -> Self {
        self.options = Some(options);
        self
    }

    /// Set keep-alive (`"5m"`, seconds, or `0` to unload)
    #[must_use]
    pub fn with_keep_alive(mut self, keep_alive: serde_json::Value) -> Self {
        self.keep_alive = Some(keep_alive);
        self
    }

    /// Set tool definitions
    #[must_use]
    pub fn with_tools(mut self, tools: Vec<serde_json::Value>) -> Self {
        self.tools = Some(tools);
        self
    }

    /// The caller's reasoning request, defaulting to off
    #[must_use]
    pub fn requested_think(&self) -> ThinkSetting {
        self.think.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_builder() {
        let request = ChatRequest::new("qwen3")
            .with_message(Message::system("You are helpful"))
            .with_prompt("Hello")
            .with_think(ThinkLevel::High)
            .with_options(serde_json::json!({"temperature": 0.1}));

        assert_eq!(request.model, "qwen3");
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.think, Some(ThinkSetting::Level(ThinkLevel::High)));
        assert!(request.options.is_some());
    }

    #[test]
    fn test_think_setting_serde() {
        assert_eq!(serde_json::to_string(&ThinkSetting::OFF).unwrap(), "false");
        assert_eq!(
            serde_json::to_string(&ThinkSetting::Level(ThinkLevel::Medium)).unwrap(),
            r#""medium""#
        );
        let level: ThinkSetting = serde_json::from_str(r#""low""#).unwrap();
        assert_eq!(level, ThinkSetting::Level(ThinkLevel::Low));
        let flag: ThinkSetting = serde_json::from_str("true").unwrap();
        assert_eq!(flag, ThinkSetting::Enabled(true));
    }

    #[test]
    fn test_think_setting_from_str() {
        assert_eq!("true".parse::<ThinkSetting>().unwrap(), ThinkSetting::Enabled(true));
        assert_eq!("OFF".parse::<ThinkSetting>().unwrap(), ThinkSetting::OFF);
        assert_eq!(
            "high".parse::<ThinkSetting>().unwrap(),
            ThinkSetting::Level(ThinkLevel::High)
        );
        assert!("maybe".parse::<ThinkSetting>().is_err());
    }

    #[test]
    fn test_think_setting_is_enabled() {
        assert!(!ThinkSetting::OFF.is_enabled());
        assert!(ThinkSetting::Enabled(true).is_enabled());
        assert!(ThinkSetting::Level(ThinkLevel::Low).is_enabled());
    }

    #[test]
    fn test_request_omits_unset_fields() {
        let json = serde_json::to_value(ChatRequest::new("m").with_prompt("hi")).unwrap();
        assert!(json.get("think").is_none());
        assert!(json.get("tools").is_none());
        assert_eq!(json["stream"], false);
    }
}
