//! Rule table YAML loader
//!
//! Reads `config/rules.yaml` (or a custom path). Missing files fall back to
//! the table compiled into the binary.

use super::types::{default_patterns, InjectedMessage, Rule, RuleTable, StreamPattern};
use crate::error::{Error, Result};
use crate::segment::Pattern;
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default rule file path
const DEFAULT_RULES_PATH: &str = "config/rules.yaml";

/// Rule table shipped with the crate
pub const EMBEDDED_RULES: &str = include_str!("../../config/rules.yaml");

#[derive(Debug, Default, Deserialize)]
struct RuleFile {
    #[serde(default)]
    hacks: HacksSection,
    #[serde(default)]
    defaults: Mapping,
    #[serde(default)]
    models: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct HacksSection {
    #[serde(default = "default_enabled")]
    enabled: bool,
}

impl Default for HacksSection {
    fn default() -> Self {
        Self { enabled: true }
    }
}

fn default_enabled() -> bool {
    true
}

/// One model entry after merging over `defaults`
#[derive(Debug, Deserialize)]
struct RuleEntry {
    #[serde(default)]
    enable_thinking: bool,
    #[serde(default)]
    add_message: Option<InjectedMessage>,
    #[serde(default)]
    content_parsers: Option<Vec<Pattern>>,
    #[serde(default)]
    stream_pattern: StreamPattern,
}

impl RuleEntry {
    fn into_rule(self, prefix: &str) -> Rule {
        let mut rule = Rule::new(prefix)
            .with_force_disable_flag(!self.enable_thinking)
            .with_patterns(self.content_parsers.unwrap_or_else(default_patterns))
            .with_stream_pattern(self.stream_pattern);
        rule.injected_message = self.add_message;

        if let StreamPattern::At(index) = rule.stream_pattern {
            if index >= rule.patterns.len() && !rule.patterns.is_empty() {
                warn!(
                    prefix = %prefix,
                    index,
                    "stream_pattern index out of range, using the last pattern"
                );
            }
        }
        rule
    }
}

impl RuleTable {
    /// The rule table compiled into the crate
    ///
    /// # Errors
    /// Only if the embedded YAML is invalid, which the test suite rules out
    pub fn embedded() -> Result<Self> {
        Self::from_yaml(EMBEDDED_RULES)
    }

    /// Parse a rule table from YAML text
    ///
    /// Each entry under `models` is merged over `defaults`; missing keys
    /// inherit. Entries without a `name` are skipped. `defaults` also forms
    /// the rule for unmatched models. With `hacks.enabled: false` the
    /// result is [`RuleTable::passthrough`].
    ///
    /// # Errors
    /// - Invalid YAML
    /// - An entry with the wrong shape or an invalid pattern
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let file: RuleFile = if yaml.trim().is_empty() {
            RuleFile::default()
        } else {
            serde_yaml::from_str(yaml).map_err(|e| Error::RuleParse(e.to_string()))?
        };

        if !file.hacks.enabled {
            info!("Model rules disabled, requests and responses pass through unchanged");
            return Ok(Self::passthrough());
        }

        let default = parse_entry(Value::Mapping(file.defaults.clone()))
            .map_err(|e| Error::RuleParse(format!("defaults: {}", e)))?
            .into_rule("");

        let mut rules = Vec::with_capacity(file.models.len());
        for model in file.models {
            let Value::Mapping(entry) = model else {
                warn!("Skipping rule entry that is not a mapping");
                continue;
            };

            let Some(name) = entry
                .get("name")
                .and_then(Value::as_str)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
            else {
                warn!("Skipping rule entry without a name");
                continue;
            };

            let mut merged = file.defaults.clone();
            for (key, value) in entry {
                if key.as_str() != Some("name") {
                    merged.insert(key, value);
                }
            }

            let rule = parse_entry(Value::Mapping(merged))
                .map_err(|e| Error::RuleParse(format!("model '{}': {}", name, e)))?
                .into_rule(&name);
            debug!(prefix = %rule.prefix, patterns = rule.patterns.len(), "Loaded rule");
            rules.push(rule);
        }

        Ok(Self::new(rules, default))
    }
}

fn parse_entry(value: Value) -> std::result::Result<RuleEntry, serde_yaml::Error> {
    serde_yaml::from_value(value)
}

/// Rule file loader
#[derive(Debug)]
pub struct RuleLoader {
    path: PathBuf,
}

impl RuleLoader {
    /// Create loader with default path (`config/rules.yaml`)
    #[must_use]
    pub fn new() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_RULES_PATH),
        }
    }

    /// Create loader with custom path
    #[must_use]
    pub fn with_path(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Return rule file path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the rule table
    ///
    /// # Errors
    /// - File read failure
    /// - YAML parse failure or invalid pattern
    pub fn load(&self) -> Result<RuleTable> {
        if !self.path.exists() {
            warn!(
                "Rule file not found: {:?}, using the built-in rules",
                self.path
            );
            return RuleTable::embedded();
        }

        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| Error::RuleFile(format!("Failed to read {:?}: {}", self.path, e)))?;

        let table = RuleTable::from_yaml(&content)?;
        info!("Loaded {} model rules from {:?}", table.len(), self.path);
        Ok(table)
    }
}

impl Default for RuleLoader {
    fn default() -> Self {
        Self::new()
    }
}
