//! Error types for thinkwell-llm

use thiserror::Error;

/// LLM error type
///
/// Transport failures stay distinct from rule-table errors, which only
/// occur while loading.
#[derive(Debug, Error)]
pub enum Error {
    /// API error (sanitized provider message)
    #[error("api error: {0}")]
    Api(String),

    /// Invalid response
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Network error
    #[error("network error: {0}")]
    Network(String),

    /// Timeout
    #[error("timeout after {0}ms")]
    Timeout(u64),

    /// Response cache error
    #[error("cache error: {0}")]
    Cache(String),

    /// Rule table could not be loaded
    #[error(transparent)]
    Rules(#[from] thinkwell_core::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
