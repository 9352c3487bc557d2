//! # oxide-rulebook
//!
//! Template-driven request rules with ordered, first-match resolution.
//!
//! This crate provides:
//! - A template compiler turning `/api/{model}/{id?}` into an anchored
//!   regular expression with named groups
//! - Rules pairing one expression with arbitrary information
//! - Method constraints, either in the information or as a `VERB ` prefix
//! - Rule books that reject structurally duplicate rules and bind match
//!   results back onto requests
//!
//! ## Quick Start
//!
//! ```
//! use oxide_rulebook::{Request, Rule, RuleBook};
//! use serde_json::json;
//!
//! let info = |v: serde_json::Value| v.as_object().cloned().unwrap();
//!
//! let mut book = RuleBook::new();
//! book.add(Rule::template("/api/{model}/{id}", info(json!({ "action": "show" }))).unwrap())
//!     .unwrap();
//! book.add(Rule::template("/api/{model}", info(json!({ "action": "list" }))).unwrap())
//!     .unwrap();
//!
//! let result = book.matching("/api/users").unwrap();
//! assert_eq!(result["action"], "list");
//! assert_eq!(result["model"], "users");
//! ```
//!
//! ## Template Syntax
//!
//! | Placeholder        | Matches                                   |
//! |--------------------|-------------------------------------------|
//! | `{name}`           | one or more of `[A-Za-z0-9]`              |
//! | `{name?}`          | same, or nothing                          |
//! | `{name*}`          | one or more of any character              |
//! | `{name:pattern}`   | `pattern`, used verbatim                  |
//! | `{name:pattern?}`  | `pattern`, or nothing                     |
//!
//! `/` and `.` match themselves but may be absent. Expressions are
//! anchored at both ends, so `/api/{model}/{id}` never matches
//! `/api/users/324/extra`.
//!
//! ## Duplicates
//!
//! Rules are identified by a hash of their expression with capture-group
//! names erased, so `/api/{model}` and `/api/{kind}` are the same rule:
//!
//! ```
//! use oxide_rulebook::{Rule, RuleBook, RuleError};
//! use serde_json::Map;
//!
//! let mut book = RuleBook::new();
//! book.add(Rule::template("/api/{model}", Map::new()).unwrap()).unwrap();
//!
//! let err = book.add(Rule::template("/api/{kind}", Map::new()).unwrap()).unwrap_err();
//! assert!(matches!(err, RuleError::DuplicateRule { .. }));
//! ```

mod error;
pub mod expression;
mod request;
mod rule;
mod rulebook;
pub mod template;

pub use error::{Result, RuleError};
pub use expression::{Expression, SourceKind};
pub use request::{Bindable, Method, Parameters, Request, Routable};
pub use rule::{Information, Rule, RuleMatch, METHOD_KEY};
pub use rulebook::{MatchResult, RuleBook, SharedRuleBook};
