//! Error types for rule construction and rule books.

use std::sync::Arc;

use thiserror::Error;

use crate::rule::Rule;

/// Rule-specific errors.
#[derive(Debug, Error)]
pub enum RuleError {
    /// A structurally identical rule is already in the book.
    #[error("duplicate rule: {rule}")]
    DuplicateRule {
        /// The rule that was rejected.
        rule: Arc<Rule>,
    },

    /// A bulk load was given something other than a source → information mapping.
    #[error("invalid load argument: {0}")]
    InvalidLoadArgument(String),

    /// The expression cannot be built into a matcher.
    #[error("invalid expression `{expression}`: {source}")]
    InvalidExpression {
        expression: String,
        #[source]
        source: regex::Error,
    },

    /// Rule table could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RuleError {
    /// Returns the rejected rule for a [`RuleError::DuplicateRule`].
    pub fn rule(&self) -> Option<&Arc<Rule>> {
        match self {
            Self::DuplicateRule { rule } => Some(rule),
            _ => None,
        }
    }

    /// Consumes the error, handing back the rejected rule if there is one.
    pub fn into_rule(self) -> Option<Arc<Rule>> {
        match self {
            Self::DuplicateRule { rule } => Some(rule),
            _ => None,
        }
    }
}

/// Result type alias for rule operations.
pub type Result<T> = std::result::Result<T, RuleError>;
