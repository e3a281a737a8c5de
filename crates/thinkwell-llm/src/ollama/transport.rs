use crate::error::{Error, Result};
use crate::ollama::{
    security,
    types::{
        ChatResponse, GenerateResponse, ModelInfo, OllamaConfig, OllamaError, TagsResponse,
        UnloadRequest,
    },
};
use crate::transport::{ChatTransport, ChunkStream};
use futures::StreamExt;
use reqwest::{Client, Response};
use serde::Serialize;
use thinkwell_core::ChatRequest;
use tokio::sync::mpsc;
use tracing::{debug, instrument, warn};

/// Buffer size of the chunk channel between the reader task and the consumer
const STREAM_CHANNEL_CAPACITY: usize = 32;

/// Ollama HTTP transport
pub struct OllamaTransport {
    client: Client,
    config: OllamaConfig,
}

impl OllamaTransport {
    /// Create a new Ollama transport
    pub fn new(config: OllamaConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Create with default configuration
    pub fn with_defaults() -> Result<Self> {
        Self::new(OllamaConfig::default())
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(OllamaConfig::from_env())
    }

    /// Base URL in use
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Check if Ollama is available
    pub async fn is_available(&self) -> bool {
        let url = format!("{}/api/tags", self.config.base_url);
        self.client.get(&url).send().await.is_ok()
    }

    fn map_send_error(&self, e: reqwest::Error) -> Error {
        if e.is_connect() {
            Error::Network(format!(
                "Failed to connect to Ollama at {}. Is Ollama running?",
                self.config.base_url
            ))
        } else if e.is_timeout() {
            Error::Timeout(self.config.timeout.as_millis() as u64)
        } else {
            Error::Network(e.to_string())
        }
    }

    /// POST a JSON body and return the response once the status is known good
    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Response> {
        let url = format!("{}{}", self.config.base_url, path);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;
        if let Ok(error) = serde_json::from_str::<OllamaError>(&body) {
            // SECURITY: Sanitize error messages
            return Err(Error::Api(security::sanitize_api_error(&error.error)));
        }
        // SECURITY: Don't expose raw HTTP response body
        Err(Error::Api(security::sanitize_api_error(&format!(
            "HTTP {}: {}",
            status, body
        ))))
    }
}

#[async_trait::async_trait]
impl ChatTransport for OllamaTransport {
    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let mut body = request.clone();
        body.stream = false;

        debug!("Sending request to Ollama: {}", body.model);
        let response = self.post("/api/chat", &body).await?;
        let text = response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        serde_json::from_str(&text).map_err(|e| Error::InvalidResponse(format!("{}: {}", e, text)))
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn chat_stream(&self, request: &ChatRequest) -> Result<ChunkStream> {
        let mut body = request.clone();
        body.stream = true;

        debug!("Opening stream to Ollama: {}", body.model);
        let response = self.post("/api/chat", &body).await?;

        let (tx, rx) = mpsc::channel(STREAM_CHANNEL_CAPACITY);
        tokio::spawn(async move {
            let mut bytes = response.bytes_stream();
            let mut lines = LineBuffer::default();

            while let Some(item) = bytes.next().await {
                let chunk = match item {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        let _ = tx.send(Err(Error::Network(e.to_string()))).await;
                        return;
                    }
                };

                for line in lines.push(&chunk) {
                    let parsed = parse_chunk(&line);
                    let failed = parsed.is_err();
                    if tx.send(parsed).await.is_err() || failed {
                        return;
                    }
                }
            }

            if let Some(line) = lines.finish() {
                let _ = tx.send(parse_chunk(&line)).await;
            }
        });

        Ok(Box::pin(futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        })))
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let url = format!("{}/api/tags", self.config.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !response.status().is_success() {
            return Err(Error::Api(format!(
                "Ollama returned status {}",
                response.status()
            )));
        }

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| Error::InvalidResponse(e.to_string()))?;

        Ok(tags.models)
    }

    #[instrument(skip(self))]
    async fn unload(&self, model: &str) -> Result<GenerateResponse> {
        let body = UnloadRequest {
            model,
            keep_alive: 0,
        };
        let response = self.post("/api/generate", &body).await?;

        response
            .json()
            .await
            .map_err(|e| Error::InvalidResponse(e.to_string()))
    }
}

/// Parse one NDJSON line of a streamed chat response
pub(crate) fn parse_chunk(line: &str) -> Result<ChatResponse> {
    if let Ok(error) = serde_json::from_str::<OllamaError>(line) {
        warn!("Ollama reported an error mid-stream");
        return Err(Error::Api(security::sanitize_api_error(&error.error)));
    }
    serde_json::from_str(line).map_err(|e| Error::InvalidResponse(format!("{}: {}", e, line)))
}

/// Splits a byte stream into complete lines
///
/// Network reads can end anywhere, including inside a UTF-8 sequence, so
/// bytes are held until a newline arrives.
#[derive(Debug, Default)]
pub(crate) struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    /// Add bytes and return every completed, non-blank line
    pub(crate) fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(bytes);

        let mut lines = Vec::new();
        while let Some(newline) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=newline).collect();
            let text = String::from_utf8_lossy(&line);
            let text = text.trim();
            if !text.is_empty() {
                lines.push(text.to_string());
            }
        }
        lines
    }

    /// Remaining text without a trailing newline
    pub(crate) fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.pending);
        let text = String::from_utf8_lossy(&rest);
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}
