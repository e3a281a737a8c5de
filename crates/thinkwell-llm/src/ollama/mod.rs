//! Ollama - Local Ollama API transport
//!
//! Implements [`ChatTransport`](crate::transport::ChatTransport) over the
//! Ollama HTTP API: `/api/chat` (whole and NDJSON-streamed), `/api/tags`
//! and `/api/generate` for unloading.

#![allow(missing_docs)]

mod security;
pub mod transport;
pub mod types;


pub use transport::OllamaTransport;
pub use types::{
    ChatResponse, FunctionCall, GenerateResponse, ModelInfo, OllamaConfig, ResponseMessage,
    ToolCall, DEFAULT_BASE_URL,
};
