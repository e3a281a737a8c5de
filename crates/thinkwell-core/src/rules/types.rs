//! Rule record types

use crate::message::{Message, MessageRole};
use crate::segment::Pattern;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Pattern used when a rule does not list its own
pub const DEFAULT_PATTERN: &str = "<think>(?P<thinking>.*?)</think>(?P<content>.*)";

static DEFAULT_PATTERNS: LazyLock<Vec<Pattern>> = LazyLock::new(|| {
    vec![Pattern::new(DEFAULT_PATTERN).expect("DEFAULT_PATTERN is a compile-time constant")]
});

/// The built-in tag pattern, as a one-element list
#[must_use]
pub fn default_patterns() -> Vec<Pattern> {
    DEFAULT_PATTERNS.clone()
}

/// Where an injected message goes in the conversation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InjectPosition {
    /// Before the caller's first message
    #[default]
    Prepend,
    /// After the caller's last message
    Append,
}

/// Extra message a rule adds to every conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InjectedMessage {
    /// Message role (`system`, `control`, ...)
    pub role: MessageRole,
    /// Message text
    pub content: String,
    /// Placement relative to the caller's messages
    #[serde(default)]
    pub position: InjectPosition,
}

impl InjectedMessage {
    /// Create a message injected before the conversation
    #[must_use]
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            position: InjectPosition::Prepend,
        }
    }

    /// Set the placement
    #[must_use]
    pub fn with_position(mut self, position: InjectPosition) -> Self {
        self.position = position;
        self
    }

    /// Build the conversation message
    #[must_use]
    pub fn to_message(&self) -> Message {
        Message::new(self.role, self.content.clone())
    }
}

/// Which configured pattern drives streaming segmentation
///
/// Written in rule files as `first`, `last` or a zero-based index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawStreamPattern", into = "RawStreamPattern")]
pub enum StreamPattern {
    /// The first pattern
    First,
    /// The last pattern
    #[default]
    Last,
    /// The pattern at this index
    At(usize),
}

impl StreamPattern {
    /// Pick the streaming pattern from a rule's list
    ///
    /// An out-of-range index falls back to the last pattern. `None` only
    /// for an empty list.
    #[must_use]
    pub fn select<'a>(&self, patterns: &'a [Pattern]) -> Option<&'a Pattern> {
        match self {
            Self::First => patterns.first(),
            Self::Last => patterns.last(),
            Self::At(index) => patterns.get(*index).or_else(|| patterns.last()),
        }
    }
}

impl std::fmt::Display for StreamPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::First => f.write_str("first"),
            Self::Last => f.write_str("last"),
            Self::At(index) => write!(f, "{}", index),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawStreamPattern {
    Index(usize),
    Name(String),
}

impl TryFrom<RawStreamPattern> for StreamPattern {
    type Error = String;

    fn try_from(raw: RawStreamPattern) -> std::result::Result<Self, Self::Error> {
        match raw {
            RawStreamPattern::Index(index) => Ok(Self::At(index)),
            RawStreamPattern::Name(name) => match name.to_lowercase().as_str() {
                "first" => Ok(Self::First),
                "last" => Ok(Self::Last),
                other => Err(format!(
                    "invalid stream_pattern '{}': expected first, last or an index",
                    other
                )),
            },
        }
    }
}

impl From<StreamPattern> for RawStreamPattern {
    fn from(selection: StreamPattern) -> Self {
        match selection {
            StreamPattern::First => Self::Name("first".to_string()),
            StreamPattern::Last => Self::Name("last".to_string()),
            StreamPattern::At(index) => Self::Index(index),
        }
    }
}

/// Per-model override record
///
/// A rule applies to every model whose identifier starts with `prefix`.
/// Rules are plain values; all behavior lives in the resolver and shaper.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rule {
    /// Model identifier prefix (empty for the default rule)
    pub prefix: String,
    /// Send `think: false` whatever the caller asked for
    pub force_disable_flag: bool,
    /// Message added to the conversation
    pub injected_message: Option<InjectedMessage>,
    /// Extraction patterns, tried in order on whole text
    pub patterns: Vec<Pattern>,
    /// Pattern used when streaming
    pub stream_pattern: StreamPattern,
}

impl Rule {
    /// Create a rule with the default settings: flag forced off, no
    /// injected message, the built-in tag pattern
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            force_disable_flag: true,
            injected_message: None,
            patterns: default_patterns(),
            stream_pattern: StreamPattern::Last,
        }
    }

    /// Rule applied when nothing else matches
    #[must_use]
    pub fn builtin_default() -> Self {
        Self::new("")
    }

    /// Rule that leaves requests and responses untouched
    #[must_use]
    pub fn passthrough() -> Self {
        Self::new("")
            .with_force_disable_flag(false)
            .with_patterns(Vec::new())
    }

    /// Set whether the reasoning flag is forced off
    #[must_use]
    pub fn with_force_disable_flag(mut self, force: bool) -> Self {
        self.force_disable_flag = force;
        self
    }

    /// Set the injected message
    #[must_use]
    pub fn with_injected_message(mut self, message: InjectedMessage) -> Self {
        self.injected_message = Some(message);
        self
    }

    /// Replace the extraction patterns
    #[must_use]
    pub fn with_patterns(mut self, patterns: Vec<Pattern>) -> Self {
        self.patterns = patterns;
        self
    }

    /// Set the streaming pattern selection
    #[must_use]
    pub fn with_stream_pattern(mut self, selection: StreamPattern) -> Self {
        self.stream_pattern = selection;
        self
    }

    /// Whether this rule applies to a model identifier
    #[must_use]
    pub fn matches(&self, model: &str) -> bool {
        model.starts_with(&self.prefix)
    }

    /// The pattern used for streaming, if any
    #[must_use]
    pub fn streaming_pattern(&self) -> Option<&Pattern> {
        self.stream_pattern.select(&self.patterns)
    }
}

impl Default for Rule {
    fn default() -> Self {
        Self::builtin_default()
    }
}

/// Ordered rule list plus a default
///
/// Lookup is linear and first-match-wins: declaration order decides, not
/// prefix length.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleTable {
    rules: Vec<Rule>,
    default: Rule,
}

impl RuleTable {
    /// Create a table from ordered rules and a default
    #[must_use]
    pub fn new(rules: Vec<Rule>, default: Rule) -> Self {
        Self { rules, default }
    }

    /// Table with no rules and a default that changes nothing
    #[must_use]
    pub fn passthrough() -> Self {
        Self::new(Vec::new(), Rule::passthrough())
    }

    /// Append a rule after the existing ones
    #[must_use]
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// First rule whose prefix matches, or the default
    #[must_use]
    pub fn lookup(&self, model: &str) -> &Rule {
        self.find(model).unwrap_or(&self.default)
    }

    /// First rule whose prefix matches
    #[must_use]
    pub fn find(&self, model: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.matches(model))
    }

    /// Rules in declaration order
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Default rule
    #[must_use]
    pub fn default_rule(&self) -> &Rule {
        &self.default
    }

    /// Number of rules (excluding the default)
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// No rules besides the default
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::new(Vec::new(), Rule::builtin_default())
    }
}
