//! Segment - split raw model output into reasoning and content
//!
//! Two delivery modes share one pattern vocabulary:
//!
//! - **Whole text**: every pattern is tried in order against the complete
//!   response and the first match wins. No match means the whole text is
//!   content.
//! - **Streaming**: a single pattern drives a three-state machine
//!   (`Undetermined`, `InReasoning`, `InContent`) that classifies fragments
//!   as they arrive, holding back only text that could be the start of the
//!   next delimiter.
//!
//! For any split of a well-formed response into fragments, the streamed
//! reasoning and content add up to the whole-text result. A response that
//! opens a delimiter and never closes it (truncated output) is flushed in
//! the mode it was in when the stream ended.
//!
//! # Module Structure
//!
//! - `pattern`: compiled extraction patterns (whole-text matching)
//! - `plan`: delimiter steps derived from a pattern for streaming
//! - `delimiter`: leftmost/partial delimiter matching
//! - `stream`: the per-stream state machine

mod delimiter;
mod pattern;
mod plan;
mod stream;


pub use pattern::{Pattern, CONTENT_GROUP, REASONING_GROUPS};
pub use stream::StreamSegmenter;

use serde::{Deserialize, Serialize};

/// Classification mode of the streaming segmenter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentMode {
    /// No delimiter seen yet; text is content until one appears
    #[default]
    Undetermined,
    /// Inside the reasoning capture
    InReasoning,
    /// Inside the content capture (or past the last delimiter)
    InContent,
}

/// Reasoning and content split from model output
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentResult {
    /// Reasoning text (empty when there is none)
    pub reasoning: String,
    /// Answer text (empty when there is none)
    pub content: String,
}

impl SegmentResult {
    /// Create a result from its parts
    #[must_use]
    pub fn new(reasoning: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            reasoning: reasoning.into(),
            content: content.into(),
        }
    }

    /// Content only
    #[must_use]
    pub fn content_only(content: impl Into<String>) -> Self {
        Self::new(String::new(), content)
    }

    /// Both parts are empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reasoning.is_empty() && self.content.is_empty()
    }

    /// Append another result
    pub fn extend(&mut self, other: SegmentResult) {
        self.reasoning.push_str(&other.reasoning);
        self.content.push_str(&other.content);
    }

    /// Destructure into `(reasoning, content)`
    #[must_use]
    pub fn into_parts(self) -> (String, String) {
        (self.reasoning, self.content)
    }

    pub(crate) fn push(&mut self, mode: SegmentMode, text: &str) {
        match mode {
            SegmentMode::InReasoning => self.reasoning.push_str(text),
            SegmentMode::Undetermined | SegmentMode::InContent => self.content.push_str(text),
        }
    }
}

/// Segment complete text with the first matching pattern
///
/// An empty pattern list, or no matching pattern, yields the whole text as
/// content.
#[must_use]
pub fn segment_whole(text: &str, patterns: &[Pattern]) -> SegmentResult {
    patterns
        .iter()
        .find_map(|pattern| pattern.extract(text))
        .unwrap_or_else(|| SegmentResult::content_only(text))
}
