//! Chat transport abstraction
//!
//! The client talks to the model server only through [`ChatTransport`], so
//! the HTTP implementation can be swapped for a mock in tests.

use crate::error::Result;
use crate::ollama::types::{ChatResponse, GenerateResponse, ModelInfo};
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;
use thinkwell_core::ChatRequest;

/// Sequence of raw streamed chunks; the last one has `done = true`
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<ChatResponse>> + Send>>;

/// Chat-completion transport
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send a request and wait for the complete response
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse>;

    /// Send a request and receive the response as it is generated
    async fn chat_stream(&self, request: &ChatRequest) -> Result<ChunkStream>;

    /// Models available on the server
    async fn list_models(&self) -> Result<Vec<ModelInfo>>;

    /// Unload a model from memory
    async fn unload(&self, model: &str) -> Result<GenerateResponse>;
}
