//! Thinkwell LLM - Transport, Cache and Client
//!
//! This crate connects the Thinkwell core to a model server:
//! - Transport: the `ChatTransport` trait and the Ollama HTTP implementation
//! - Cache: fingerprint-keyed on-disk storage of raw responses
//! - Client: resolve, shape, send, segment and assemble in one call
//! - Mock: a queued in-memory transport for tests

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cache;
pub mod client;
pub mod error;
pub mod mock;
pub mod ollama;
pub mod transport;

pub use cache::ResponseCache;
pub use client::{ThinkChatResponse, ThinkClient, ThinkStream};
pub use error::{Error, Result};
pub use ollama::{ChatResponse, GenerateResponse, ModelInfo, OllamaConfig, OllamaTransport};
pub use transport::{ChatTransport, ChunkStream};
