//! Rules - per-model request and response overrides
//!
//! Model-specific behavior is data: an ordered list of [`Rule`] records
//! matched by identifier prefix, plus one default. Nothing here is
//! model-specific code.
//!
//! # Example
//!
//! ```rust,ignore
//! use thinkwell_core::rules::RuleLoader;
//!
//! let table = RuleLoader::new().load()?;
//! let rule = table.lookup("granite3.2-vision:latest");
//! assert_eq!(rule.prefix, "granite3.2");
//! ```

mod loader;
mod types;


pub use loader::{RuleLoader, EMBEDDED_RULES};
pub use types::{
    default_patterns, InjectPosition, InjectedMessage, Rule, RuleTable, StreamPattern,
    DEFAULT_PATTERN,
};
