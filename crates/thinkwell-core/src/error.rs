//! Error types for thinkwell-core
//!
//! Resolution, shaping and segmentation are total and never fail. The only
//! fallible operations in this crate are loading and compiling rule tables.

use thiserror::Error;

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// Rule file could not be read
    #[error("rule file error: {0}")]
    RuleFile(String),

    /// Rule file is not valid YAML or has the wrong shape
    #[error("rule parse error: {0}")]
    RuleParse(String),

    /// Extraction pattern failed to compile
    #[error("invalid pattern {pattern:?}: {message}")]
    InvalidPattern {
        /// Pattern source text
        pattern: String,
        /// Compiler message
        message: String,
    },

    /// Extraction pattern uses a capture group other than reasoning/content
    #[error("unsupported capture group name: '{0}'")]
    UnsupportedGroup(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
