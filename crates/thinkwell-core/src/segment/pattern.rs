//! Extraction patterns
//!
//! A pattern is a regular expression with named groups `reasoning` (or its
//! synonym `thinking`) and `content`. Either group may be missing. Patterns
//! are compiled with `.` matching newlines, so `.*?` spans whole paragraphs.

use super::plan::StreamPlan;
use super::SegmentResult;
use crate::error::{Error, Result};
use regex::Regex;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Group names accepted for the reasoning capture
pub const REASONING_GROUPS: &[&str] = &["reasoning", "thinking"];

/// Group name for the answer capture
pub const CONTENT_GROUP: &str = "content";

/// Compiled extraction pattern
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
    reasoning_group: Option<&'static str>,
    plan: Option<StreamPlan>,
}

impl Pattern {
    /// Compile a pattern
    ///
    /// # Errors
    /// - The regex does not compile
    /// - A named group other than `reasoning`, `thinking` or `content` is used
    /// - Both `reasoning` and `thinking` are present
    pub fn new(source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let regex = Regex::new(&format!("(?s){}", source)).map_err(|e| Error::InvalidPattern {
            pattern: source.clone(),
            message: e.to_string(),
        })?;

        let mut reasoning_group = None;
        for name in regex.capture_names().flatten() {
            if let Some(group) = REASONING_GROUPS.iter().find(|g| **g == name) {
                if reasoning_group.is_some() {
                    return Err(Error::InvalidPattern {
                        pattern: source,
                        message: "more than one reasoning group".to_string(),
                    });
                }
                reasoning_group = Some(*group);
            } else if name != CONTENT_GROUP {
                return Err(Error::UnsupportedGroup(name.to_string()));
            }
        }

        let plan = StreamPlan::compile(&source);

        Ok(Self {
            source,
            regex,
            reasoning_group,
            plan,
        })
    }

    /// Pattern source as written in the rule table
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether the streaming segmenter can split this pattern incrementally
    #[must_use]
    pub fn is_streamable(&self) -> bool {
        self.plan.is_some()
    }

    pub(crate) fn plan(&self) -> Option<&StreamPlan> {
        self.plan.as_ref()
    }

    /// Match against complete text
    ///
    /// Returns `None` when the pattern does not match. On a match, text
    /// before and after the matched span is kept as content around the
    /// `content` capture, so nothing outside the delimiters is lost.
    #[must_use]
    pub fn extract(&self, text: &str) -> Option<SegmentResult> {
        let captures = self.regex.captures(text)?;
        let span = captures.get(0)?;

        let reasoning = self
            .reasoning_group
            .and_then(|name| captures.name(name))
            .map_or("", |m| m.as_str());
        let content = captures.name(CONTENT_GROUP).map_or("", |m| m.as_str());

        let mut result = SegmentResult::default();
        result.reasoning.push_str(reasoning);
        result.content.push_str(&text[..span.start()]);
        result.content.push_str(content);
        result.content.push_str(&text[span.end()..]);
        Some(result)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Pattern {}

impl TryFrom<String> for Pattern {
    type Error = Error;

    fn try_from(source: String) -> Result<Self> {
        Self::new(source)
    }
}

impl From<Pattern> for String {
    fn from(pattern: Pattern) -> Self {
        pattern.source
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Self::new(source).map_err(de::Error::custom)
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}
