//! Thinkwell Core - Model Rules and Reasoning Extraction
//!
//! This crate provides the transport-independent core of Thinkwell:
//! - Rules: per-model override records matched by identifier prefix
//! - Resolver: per-call behavior from a model identifier and reasoning request
//! - Shaper: reasoning flag override and message injection on outgoing requests
//! - Segment: reasoning/content splitting for whole and streamed responses
//! - Response: a wrapper adding the reasoning/content view to provider responses
//!
//! Resolution, shaping and segmentation never fail. Errors come only from
//! loading rule tables.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod message;
pub mod request;
pub mod resolver;
pub mod response;
pub mod rules;
pub mod segment;
pub mod shaper;

pub use error::{Error, Result};
pub use message::{Message, MessageRole};
pub use request::{ChatRequest, ThinkLevel, ThinkSetting};
pub use resolver::{EffectiveConfig, RuleResolver};
pub use response::ThinkResponse;
pub use rules::{InjectPosition, InjectedMessage, Rule, RuleLoader, RuleTable, StreamPattern};
pub use segment::{segment_whole, Pattern, SegmentMode, SegmentResult, StreamSegmenter};
pub use shaper::shape_request;
