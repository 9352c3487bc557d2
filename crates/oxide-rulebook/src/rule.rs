//! A single rule: one compiled expression plus its information.

use std::fmt;

use regex::Regex;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use tracing::trace;

use crate::error::{Result, RuleError};
use crate::expression::{self, Expression};
use crate::request::Routable;

/// Arbitrary metadata attached to a rule, in declaration order.
pub type Information = Map<String, Value>;

/// Information key holding a rule's method constraint.
pub const METHOD_KEY: &str = "method";

/// Outcome of testing one rule against a subject.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleMatch {
    /// Whether the rule matched.
    pub matched: bool,
    /// Named captures, empty unless matched.
    pub captures: Map<String, Value>,
}

impl RuleMatch {
    fn none() -> Self {
        Self::default()
    }
}

/// A compiled expression plus arbitrary information.
///
/// # Example
///
/// ```
/// use oxide_rulebook::{Request, Rule};
/// use serde_json::json;
///
/// let info = json!({ "controller": "users" }).as_object().cloned().unwrap();
/// let rule = Rule::template("PUT /api/{model}/{id}", info).unwrap();
///
/// assert!(!rule.is_match(&Request::get("/api/users/4")));
///
/// let found = rule.matches(&Request::put("/api/users/4"));
/// assert!(found.matched);
/// assert_eq!(found.captures["id"], "4");
/// ```
#[derive(Debug, Clone)]
pub struct Rule {
    /// Expression as compiled or supplied.
    expression: String,
    /// Template text, when built from one.
    template: Option<String>,
    information: Information,
    /// Matcher built with unique internal group names.
    regex: Regex,
    /// `(internal, public)` group names, left to right.
    groups: Vec<(String, String)>,
    hash: String,
}

impl Rule {
    /// Creates a rule from a raw expression or a template.
    ///
    /// A template's leading `VERB ` token is stored under the `method`
    /// key of `information`, replacing any value already there.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::InvalidExpression`] when the expression
    /// cannot be built into a matcher.
    pub fn create(expression: Expression, mut information: Information) -> Result<Self> {
        let (expr, method) = expression::resolve(&expression);
        let (internal, names) = expression::uniquify(&expr);

        let regex = Regex::new(&internal).map_err(|source| RuleError::InvalidExpression {
            expression: expr.clone(),
            source,
        })?;

        if let Some(method) = method {
            information.insert(METHOD_KEY.to_string(), Value::from(method.as_str()));
        }

        let groups = names
            .into_iter()
            .enumerate()
            .map(|(index, name)| (expression::internal_name(index), name))
            .collect();

        let template = match expression {
            Expression::Template(source) => Some(source),
            Expression::Raw(_) => None,
        };

        let hash = structural_hash(&expr);

        Ok(Self {
            expression: expr,
            template,
            information,
            regex,
            groups,
            hash,
        })
    }

    /// Creates a rule from a template.
    ///
    /// # Errors
    ///
    /// See [`Rule::create`].
    pub fn template(source: impl Into<String>, information: Information) -> Result<Self> {
        Self::create(Expression::Template(source.into()), information)
    }

    /// Creates a rule from a raw expression.
    ///
    /// # Errors
    ///
    /// See [`Rule::create`].
    pub fn raw(source: impl Into<String>, information: Information) -> Result<Self> {
        Self::create(Expression::Raw(source.into()), information)
    }

    /// The compiled (or raw) expression.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// The template this rule was compiled from.
    pub fn template_source(&self) -> Option<&str> {
        self.template.as_deref()
    }

    /// The rule's information.
    pub fn information(&self) -> &Information {
        &self.information
    }

    /// Replaces the rule's information.
    pub fn set_information(&mut self, information: Information) {
        self.information = information;
    }

    /// The method constraint, if the information declares one.
    pub fn method(&self) -> Option<&str> {
        self.information.get(METHOD_KEY).and_then(Value::as_str)
    }

    /// Tests the rule against a path or a request.
    ///
    /// A request whose method differs from the rule's method constraint is
    /// rejected before the expression runs. When a group name repeats, the
    /// last group that took part in the match provides the value.
    pub fn matches<S: Routable + ?Sized>(&self, subject: &S) -> RuleMatch {
        if let (Some(required), Some(actual)) = (self.method(), subject.method()) {
            if required != actual {
                trace!(rule = %self.expression, required, actual, "method mismatch");
                return RuleMatch::none();
            }
        }

        let path = subject.path();
        let Some(caps) = self.regex.captures(path) else {
            trace!(rule = %self.expression, path, "no match");
            return RuleMatch::none();
        };

        let mut captures = Map::new();
        for (internal, name) in &self.groups {
            if let Some(value) = caps.name(internal) {
                captures.insert(name.clone(), Value::from(value.as_str()));
            }
        }

        trace!(rule = %self.expression, path, "matched");
        RuleMatch {
            matched: true,
            captures,
        }
    }

    /// Returns `true` if the rule matches the subject.
    pub fn is_match<S: Routable + ?Sized>(&self, subject: &S) -> bool {
        self.matches(subject).matched
    }

    /// Structural hash: SHA-256 hex digest of the expression with every
    /// capture-group name erased.
    pub fn hash(&self) -> &str {
        &self.hash
    }
}

fn structural_hash(expr: &str) -> String {
    let canonical = expression::canonicalize(expr);
    format!("{:x}", Sha256::digest(canonical.as_bytes()))
}

impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        self.expression == other.expression && self.information == other.information
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression)
    }
}
