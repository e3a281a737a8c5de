//! Thinking-aware chat client
//!
//! Every call goes through the same pipeline: resolve the model's rule,
//! shape the request, answer from the cache or the transport, then split
//! each response into reasoning and content.

use crate::cache::ResponseCache;
use crate::error::Result;
use crate::ollama::types::{ChatResponse, GenerateResponse, ModelInfo};
use crate::transport::{ChatTransport, ChunkStream};
use futures::{Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use thinkwell_core::{
    shape_request, ChatRequest, EffectiveConfig, RuleResolver, SegmentResult, StreamSegmenter,
    ThinkResponse, ThinkSetting,
};
use tracing::{debug, instrument, warn};

/// A chat response with its reasoning/content split
pub type ThinkChatResponse = ThinkResponse<ChatResponse>;

/// Stream of segmented chunks
pub type ThinkStream = Pin<Box<dyn Stream<Item = Result<ThinkChatResponse>> + Send>>;

/// Chat client applying model rules to requests and responses
#[derive(Clone)]
pub struct ThinkClient {
    transport: Arc<dyn ChatTransport>,
    resolver: Arc<RuleResolver>,
    cache: Option<ResponseCache>,
}

impl ThinkClient {
    /// Create a client without a response cache
    #[must_use]
    pub fn new(transport: Arc<dyn ChatTransport>, resolver: RuleResolver) -> Self {
        Self {
            transport,
            resolver: Arc::new(resolver),
            cache: None,
        }
    }

    /// Enable the response cache
    #[must_use]
    pub fn with_cache(mut self, cache: ResponseCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Rule resolver in use
    #[must_use]
    pub fn resolver(&self) -> &RuleResolver {
        &self.resolver
    }

    /// Response cache, if enabled
    #[must_use]
    pub fn cache(&self) -> Option<&ResponseCache> {
        self.cache.as_ref()
    }

    /// Resolve and shape a request without sending it
    ///
    /// Without an explicit `think`, streamed requests ask for reasoning and
    /// whole requests do not.
    #[must_use]
    pub fn prepare(&self, request: &ChatRequest, stream: bool) -> (EffectiveConfig, ChatRequest) {
        let requested = request.think.unwrap_or(ThinkSetting::Enabled(stream));
        let effective = self.resolver.resolve(&request.model, requested);
        let mut shaped = shape_request(request, &effective);
        shaped.stream = stream;
        (effective, shaped)
    }

    fn cache_key(&self, shaped: &ChatRequest, use_cache: bool) -> Option<(ResponseCache, String)> {
        let cache = self.cache.as_ref().filter(|_| use_cache)?;
        match ResponseCache::fingerprint(shaped) {
            Ok(key) => Some((cache.clone(), key)),
            Err(e) => {
                warn!("Skipping cache, request has no fingerprint: {}", e);
                None
            }
        }
    }

    /// Send a request and wait for the whole response
    ///
    /// # Errors
    /// Transport failures; cache failures are logged and ignored
    #[instrument(skip(self, request), fields(model = %request.model))]
    pub async fn call(&self, request: &ChatRequest, use_cache: bool) -> Result<ThinkChatResponse> {
        let (effective, shaped) = self.prepare(request, false);
        let cached = self.cache_key(&shaped, use_cache);

        if let Some((cache, key)) = &cached {
            match cache.get::<ChatResponse>(key).await {
                Ok(Some(raw)) => return Ok(assemble(raw, &effective)),
                Ok(None) => {}
                Err(e) => warn!("Ignoring unreadable cache entry: {}", e),
            }
        }

        let raw = self.transport.chat(&shaped).await?;

        if let Some((cache, key)) = &cached {
            if let Err(e) = cache.put(key, &shaped.model, &raw).await {
                warn!("Failed to cache response: {}", e);
            }
        }

        Ok(assemble(raw, &effective))
    }

    /// Send a request and receive segmented chunks as they arrive
    ///
    /// Every raw chunk is yielded, including ones whose text is held back
    /// or is only a delimiter. The segmenter is flushed on the `done` chunk.
    /// A cache hit replays the recorded chunks through a fresh segmenter.
    ///
    /// # Errors
    /// The stream could not be opened; errors inside the stream are yielded
    #[instrument(skip(self, request), fields(model = %request.model))]
    pub async fn stream(&self, request: &ChatRequest, use_cache: bool) -> Result<ThinkStream> {
        let (effective, shaped) = self.prepare(request, true);
        let cached = self.cache_key(&shaped, use_cache);

        if let Some((cache, key)) = &cached {
            match cache.get::<Vec<ChatResponse>>(key).await {
                Ok(Some(chunks)) => {
                    debug!("Replaying {} cached chunks", chunks.len());
                    let source: ChunkStream =
                        Box::pin(futures::stream::iter(chunks.into_iter().map(Ok)));
                    return Ok(segment_stream(source, &effective, &shaped.model, None));
                }
                Ok(None) => {}
                Err(e) => warn!("Ignoring unreadable cache entry: {}", e),
            }
        }

        let source = self.transport.chat_stream(&shaped).await?;
        let recorder = cached.map(|(cache, key)| Recorder {
            cache,
            key,
            chunks: Vec::new(),
        });
        Ok(segment_stream(source, &effective, &shaped.model, recorder))
    }

    /// Models available on the server
    ///
    /// # Errors
    /// Transport failures
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        self.transport.list_models().await
    }

    /// Unload a model from memory
    ///
    /// # Errors
    /// Transport failures
    #[instrument(skip(self))]
    pub async fn unload(&self, model: &str) -> Result<GenerateResponse> {
        self.transport.unload(model).await
    }

    /// Remove every cached response
    ///
    /// # Errors
    /// The cache directory cannot be cleared
    pub async fn clear_cache(&self) -> Result<usize> {
        match &self.cache {
            Some(cache) => cache.clear().await,
            None => Ok(0),
        }
    }
}

/// Attach a segmentation to a whole response
fn assemble(raw: ChatResponse, effective: &EffectiveConfig) -> ThinkChatResponse {
    let segment = with_native_thinking(&raw, effective.segment(raw.text()));
    ThinkResponse::new(raw, segment)
}

/// Reasoning the provider reported natively comes before extracted reasoning
fn with_native_thinking(raw: &ChatResponse, mut segment: SegmentResult) -> SegmentResult {
    let native = raw.native_thinking();
    if !native.is_empty() {
        segment.reasoning.insert_str(0, native);
    }
    segment
}

struct Recorder {
    cache: ResponseCache,
    key: String,
    chunks: Vec<ChatResponse>,
}

struct StreamState {
    source: ChunkStream,
    segmenter: StreamSegmenter,
    model: String,
    recorder: Option<Recorder>,
    finished: bool,
}

fn segment_stream(
    source: ChunkStream,
    effective: &EffectiveConfig,
    model: &str,
    recorder: Option<Recorder>,
) -> ThinkStream {
    let state = StreamState {
        source,
        segmenter: effective.stream_segmenter(),
        model: model.to_string(),
        recorder,
        finished: false,
    };
    Box::pin(futures::stream::unfold(state, next_chunk))
}

async fn next_chunk(mut state: StreamState) -> Option<(Result<ThinkChatResponse>, StreamState)> {
    if state.finished {
        return None;
    }

    match state.source.next().await {
        Some(Ok(chunk)) => {
            if let Some(recorder) = &mut state.recorder {
                recorder.chunks.push(chunk.clone());
            }

            let mut segment = state.segmenter.push(chunk.text());
            if chunk.done {
                state.finished = true;
                segment.extend(state.segmenter.finish());
                if let Some(recorder) = state.recorder.take() {
                    store(recorder, &state.model).await;
                }
            }

            let segment = with_native_thinking(&chunk, segment);
            Some((Ok(ThinkResponse::new(chunk, segment)), state))
        }
        Some(Err(e)) => {
            // a failed stream is never cached
            state.finished = true;
            state.recorder = None;
            Some((Err(e), state))
        }
        None => {
            state.finished = true;
            let rest = state.segmenter.finish();
            if rest.is_empty() {
                return None;
            }
            debug!("Stream ended without a final chunk, flushing held text");
            let raw = ChatResponse {
                model: state.model.clone(),
                ..Default::default()
            };
            Some((Ok(ThinkResponse::new(raw, rest)), state))
        }
    }
}

async fn store(recorder: Recorder, model: &str) {
    if let Err(e) = recorder
        .cache
        .put(&recorder.key, model, &recorder.chunks)
        .await
    {
        warn!("Failed to cache streamed response: {}", e);
    }
}

#[cfg(test)]
mod tests;
