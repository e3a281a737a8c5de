//! Response assembly
//!
//! [`ThinkResponse`] wraps a provider response (or one streamed chunk)
//! unchanged and adds the reasoning/content view. Provider fields stay
//! reachable through `Deref`.

use crate::segment::SegmentResult;
use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// Provider response plus its reasoning/content split
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThinkResponse<R> {
    raw: R,
    #[serde(flatten)]
    segment: SegmentResult,
}

impl<R> ThinkResponse<R> {
    /// Wrap a response with its segmentation
    #[must_use]
    pub fn new(raw: R, segment: SegmentResult) -> Self {
        Self { raw, segment }
    }

    /// Reasoning text, empty when there is none
    #[must_use]
    pub fn reasoning(&self) -> &str {
        &self.segment.reasoning
    }

    /// Answer text, empty when there is none
    #[must_use]
    pub fn content(&self) -> &str {
        &self.segment.content
    }

    /// `(reasoning, content)`
    #[must_use]
    pub fn parts(&self) -> (&str, &str) {
        (self.reasoning(), self.content())
    }

    /// The segmentation
    #[must_use]
    pub fn segment(&self) -> &SegmentResult {
        &self.segment
    }

    /// The unmodified provider response
    #[must_use]
    pub fn raw(&self) -> &R {
        &self.raw
    }

    /// Split into the provider response and the segmentation
    #[must_use]
    pub fn into_inner(self) -> (R, SegmentResult) {
        (self.raw, self.segment)
    }

    /// Consume into `(reasoning, content)`
    #[must_use]
    pub fn into_parts(self) -> (String, String) {
        self.segment.into_parts()
    }
}

impl<R: Serialize> ThinkResponse<R> {
    /// JSON of the provider response with `reasoning` and `content` added
    ///
    /// # Errors
    /// Serialization of the provider response fails
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

impl<R> Deref for ThinkResponse<R> {
    type Target = R;

    fn deref(&self) -> &R {
        &self.raw
    }
}

impl<R> std::fmt::Display for ThinkResponse<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.content())
    }
}

impl<R> From<ThinkResponse<R>> for (String, String) {
    fn from(response: ThinkResponse<R>) -> Self {
        response.into_parts()
    }
}
