use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default Ollama API URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Default request timeout (local inference can be slow)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

// ============================================================================
// API Types
// ============================================================================

/// Response from the Ollama chat endpoint, or one streamed chunk of it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The model used to generate the response
    pub model: String,
    /// Creation timestamp (RFC 3339)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// The generated message (a fragment of it when streaming)
    #[serde(default)]
    pub message: ResponseMessage,
    /// Whether generation is finished
    #[serde(default)]
    pub done: bool,
    /// Why generation stopped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done_reason: Option<String>,
    /// Total time spent processing the request (in nanoseconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_duration: Option<u64>,
    /// Time spent loading the model (in nanoseconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_duration: Option<u64>,
    /// Number of tokens in the prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_eval_count: Option<u32>,
    /// Time spent evaluating the prompt (in nanoseconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_eval_duration: Option<u64>,
    /// Number of tokens generated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eval_count: Option<u32>,
    /// Time spent generating (in nanoseconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eval_duration: Option<u64>,
}

impl ChatResponse {
    /// Raw text of the message
    #[must_use]
    pub fn text(&self) -> &str {
        &self.message.content
    }

    /// Reasoning the provider returned natively, empty when absent
    #[must_use]
    pub fn native_thinking(&self) -> &str {
        self.message.thinking.as_deref().unwrap_or("")
    }
}

/// Message format in Ollama responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseMessage {
    /// Role of the message sender
    #[serde(default = "default_role")]
    pub role: String,
    /// Content of the message
    #[serde(default)]
    pub content: String,
    /// Reasoning reported separately by models with native support
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking: Option<String>,
    /// Base64 encoded images
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    /// Tool calls requested by the model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
}

fn default_role() -> String {
    "assistant".to_string()
}

impl Default for ResponseMessage {
    fn default() -> Self {
        Self {
            role: default_role(),
            content: String::new(),
            thinking: None,
            images: None,
            tool_calls: None,
        }
    }
}

/// A tool call made by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// The function being called
    pub function: FunctionCall,
}

/// Specific function call details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Name of the function to call
    pub name: String,
    /// Arguments for the function call
    pub arguments: serde_json::Value,
}

/// Error response from Ollama API
#[derive(Debug, Deserialize)]
pub struct OllamaError {
    /// Error message
    pub error: String,
}

/// Response from the /api/tags endpoint
#[derive(Debug, Deserialize)]
pub struct TagsResponse {
    /// List of available models
    pub models: Vec<ModelInfo>,
}

/// Model information from the tags response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Name of the model (`name:tag`)
    pub name: String,
    /// Last modification time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<String>,
    /// Size on disk in bytes
    #[serde(default)]
    pub size: u64,
    /// Content digest
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Request body for unloading a model through /api/generate
#[derive(Debug, Serialize)]
pub(crate) struct UnloadRequest<'a> {
    pub model: &'a str,
    pub keep_alive: u8,
}

/// Response from /api/generate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// Model name
    pub model: String,
    /// Whether the request finished
    #[serde(default)]
    pub done: bool,
    /// Why it finished (`unload` after a keep-alive of 0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done_reason: Option<String>,
}

/// Ollama transport configuration
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Base URL (default: http://localhost:11434)
    pub base_url: String,
    /// Request timeout (longer for local inference)
    pub timeout: Duration,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl OllamaConfig {
    /// Create a new configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create configuration from environment variables
    pub fn from_env() -> Self {
        let base_url = std::env::var("OLLAMA_HOST")
            .map(|host| normalize_host(&host))
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        Self {
            base_url,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = normalize_host(&url.into());
        self
    }

    /// Set the timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Accept `OLLAMA_HOST` style values (`0.0.0.0:11434`, `localhost`) as URLs
///
/// Values with a scheme are used as given; bare hosts get `http://` and the
/// default port.
pub(crate) fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.is_empty() {
        return DEFAULT_BASE_URL.to_string();
    }
    if host.contains("://") {
        return host.to_string();
    }

    let (authority, path) = host.split_once('/').map_or((host, ""), |(a, p)| (a, p));
    let port = if authority.contains(':') { "" } else { ":11434" };
    if path.is_empty() {
        format!("http://{}{}", authority, port)
    } else {
        format!("http://{}{}/{}", authority, port, path)
    }
}
