//! Mock transport for testing
//!
//! Returns queued responses (or a default one) and records every request
//! it receives.

use crate::error::Result;
use crate::ollama::types::{ChatResponse, GenerateResponse, ModelInfo, ResponseMessage};
use crate::transport::{ChatTransport, ChunkStream};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use thinkwell_core::ChatRequest;

/// Model name reported by default responses
pub const MOCK_MODEL: &str = "mock-model";

/// A mock transport that returns queued responses or default ones.
#[derive(Clone, Default)]
pub struct MockTransport {
    responses: Arc<Mutex<VecDeque<ChatResponse>>>,
    streams: Arc<Mutex<VecDeque<Vec<ChatResponse>>>>,
    requests: Arc<Mutex<Vec<ChatRequest>>>,
}

impl MockTransport {
    /// Create a new mock transport.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a whole response to the queue.
    pub fn add_response(&self, response: ChatResponse) {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(response);
    }

    /// Add a streamed response, as its list of chunks, to the queue.
    pub fn add_stream(&self, chunks: Vec<ChatResponse>) {
        self.streams
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(chunks);
    }

    /// Requests received so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Number of chat requests received.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn record(&self, request: &ChatRequest) {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());
    }
}

/// A finished whole response with the given text
#[must_use]
pub fn text_response(model: &str, content: &str) -> ChatResponse {
    ChatResponse {
        model: model.to_string(),
        message: ResponseMessage {
            content: content.to_string(),
            ..Default::default()
        },
        done: true,
        done_reason: Some("stop".to_string()),
        ..Default::default()
    }
}

/// Streamed chunks carrying `fragments`, followed by an empty final chunk
#[must_use]
pub fn text_chunks(model: &str, fragments: &[&str]) -> Vec<ChatResponse> {
    let mut chunks: Vec<ChatResponse> = fragments
        .iter()
        .map(|fragment| ChatResponse {
            done: false,
            done_reason: None,
            ..text_response(model, fragment)
        })
        .collect();
    chunks.push(ChatResponse {
        eval_count: Some(fragments.len() as u32),
        ..text_response(model, "")
    });
    chunks
}

#[async_trait::async_trait]
impl ChatTransport for MockTransport {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        self.record(request);
        let queued = self
            .responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        Ok(queued.unwrap_or_else(|| text_response(MOCK_MODEL, "mock response")))
    }

    async fn chat_stream(&self, request: &ChatRequest) -> Result<ChunkStream> {
        self.record(request);
        let chunks = self
            .streams
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or_else(|| text_chunks(MOCK_MODEL, &["mock response"]));
        Ok(Box::pin(futures::stream::iter(chunks.into_iter().map(Ok))))
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        Ok(vec![ModelInfo {
            name: MOCK_MODEL.to_string(),
            modified_at: None,
            size: 0,
            digest: None,
        }])
    }

    async fn unload(&self, model: &str) -> Result<GenerateResponse> {
        Ok(GenerateResponse {
            model: model.to_string(),
            done: true,
            done_reason: Some("unload".to_string()),
        })
    }
}
