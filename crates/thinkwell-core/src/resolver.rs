//! Rule resolution
//!
//! Turns a model identifier and the caller's reasoning request into the
//! per-call [`EffectiveConfig`]. Resolution is total: unknown identifiers
//! get the table's default rule.

use crate::request::ThinkSetting;
use crate::rules::{InjectedMessage, Rule, RuleTable, StreamPattern};
use crate::segment::{segment_whole, Pattern, SegmentResult, StreamSegmenter};
use serde::Serialize;
use tracing::debug;

/// Behavior resolved for one call
///
/// Built fresh by [`RuleResolver::resolve`] and owned by the call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectiveConfig {
    /// Reasoning flag to send to the provider
    pub send_reasoning_flag: ThinkSetting,
    /// Message to add to the conversation
    pub injected_message: Option<InjectedMessage>,
    /// Patterns for whole-text segmentation, in order
    pub extraction_patterns: Vec<Pattern>,
    /// Which pattern drives streaming segmentation
    pub stream_pattern: StreamPattern,
    /// Prefix of the matched rule, `None` for the default rule
    pub matched_prefix: Option<String>,
}

impl EffectiveConfig {
    fn from_rule(rule: &Rule, requested: ThinkSetting, matched: bool) -> Self {
        let send_reasoning_flag = if rule.force_disable_flag {
            ThinkSetting::OFF
        } else {
            requested
        };

        Self {
            send_reasoning_flag,
            injected_message: rule.injected_message.clone(),
            extraction_patterns: rule.patterns.clone(),
            stream_pattern: rule.stream_pattern,
            matched_prefix: matched.then(|| rule.prefix.clone()),
        }
    }

    /// Segment a complete response
    #[must_use]
    pub fn segment(&self, text: &str) -> SegmentResult {
        segment_whole(text, &self.extraction_patterns)
    }

    /// The pattern used when streaming
    #[must_use]
    pub fn streaming_pattern(&self) -> Option<&Pattern> {
        self.stream_pattern.select(&self.extraction_patterns)
    }

    /// Fresh segmenter for one stream
    #[must_use]
    pub fn stream_segmenter(&self) -> StreamSegmenter {
        StreamSegmenter::new(self.streaming_pattern())
    }
}

/// Resolves model identifiers against a rule table
#[derive(Debug, Clone, Default)]
pub struct RuleResolver {
    table: RuleTable,
}

impl RuleResolver {
    /// Create a resolver over a rule table
    #[must_use]
    pub fn new(table: RuleTable) -> Self {
        Self { table }
    }

    /// Rule table in use
    #[must_use]
    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    /// Resolve the behavior for one call
    ///
    /// A rule that forces the reasoning flag off wins over the caller's
    /// request. Otherwise the caller's value, including a graded level, is
    /// passed through unchanged.
    #[must_use]
    pub fn resolve(&self, model: &str, requested: ThinkSetting) -> EffectiveConfig {
        let (rule, matched) = match self.table.find(model) {
            Some(rule) => (rule, true),
            None => (self.table.default_rule(), false),
        };

        let config = EffectiveConfig::from_rule(rule, requested, matched);
        debug!(
            model = %model,
            rule = %config.matched_prefix.as_deref().unwrap_or("<default>"),
            think = %config.send_reasoning_flag,
            patterns = config.extraction_patterns.len(),
            "Resolved model rule"
        );

        if requested.is_enabled() && !config.send_reasoning_flag.is_enabled() {
            debug!(
                model = %model,
                requested = %requested,
                sent = %config.send_reasoning_flag,
                "Reasoning flag overridden by model rule"
            );
        }

        config
    }
}
