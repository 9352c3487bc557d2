//! Ordered, duplicate-free rule collection with first-match resolution.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{Result, RuleError};
use crate::expression::SourceKind;
use crate::request::{Bindable, Routable};
use crate::rule::{Information, Rule};

/// A matched rule's information merged with its named captures.
pub type MatchResult = Map<String, Value>;

/// A rule book shared between threads.
///
/// Take the write lock around [`RuleBook::add`] and [`RuleBook::load`];
/// once the book stops growing, matching only needs the read lock.
pub type SharedRuleBook = Arc<RwLock<RuleBook>>;

/// An ordered set of rules.
///
/// Insertion order is priority order: [`RuleBook::matching`] returns the
/// first rule that matches, so more specific rules go first.
///
/// # Example
///
/// ```
/// use oxide_rulebook::{Request, RuleBook, SourceKind};
///
/// let book = RuleBook::from_json_str(
///     r#"{
///         "GET /api/{model}/{id}": { "action": "show" },
///         "/api/{model}": { "action": "list" }
///     }"#,
///     SourceKind::Template,
/// )
/// .unwrap();
///
/// let mut request = Request::get("/api/users/4");
/// let result = book.bind(&mut request).unwrap();
///
/// assert_eq!(result["action"], "show");
/// assert_eq!(request.params.get_str("id"), Some("4"));
/// ```
#[derive(Debug, Default)]
pub struct RuleBook {
    rules: Vec<Arc<Rule>>,
    hashes: HashSet<String>,
}

impl RuleBook {
    /// Creates an empty rule book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a rule book from a JSON rule table.
    ///
    /// # Errors
    ///
    /// Fails on malformed JSON and for the reasons listed on
    /// [`RuleBook::load_json`].
    pub fn from_json_str(json: &str, kind: SourceKind) -> Result<Self> {
        let table: Value = serde_json::from_str(json)?;
        let mut book = Self::new();
        book.load_json(&table, kind)?;
        Ok(book)
    }

    /// Adds a rule.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::DuplicateRule`], carrying the rejected rule,
    /// when a rule with the same structural hash is already present. The
    /// book is left unchanged.
    pub fn add(&mut self, rule: Rule) -> Result<Arc<Rule>> {
        let rule = Arc::new(rule);

        if self.hashes.contains(rule.hash()) {
            warn!(rule = %rule, "rejected duplicate rule");
            return Err(RuleError::DuplicateRule { rule });
        }

        self.hashes.insert(rule.hash().to_string());
        self.rules.push(Arc::clone(&rule));
        debug!(rule = %rule, position = self.rules.len() - 1, "added rule");

        Ok(rule)
    }

    /// Adds one rule per `(source, information)` entry, in order.
    ///
    /// Not transactional: entries added before a failing one stay in the
    /// book.
    ///
    /// # Errors
    ///
    /// Stops at the first entry that cannot be built or is a duplicate.
    pub fn load<I, S>(&mut self, entries: I, kind: SourceKind) -> Result<()>
    where
        I: IntoIterator<Item = (S, Information)>,
        S: Into<String>,
    {
        let mut added = 0usize;
        for (source, information) in entries {
            self.add(Rule::create(kind.expression(source), information)?)?;
            added += 1;
        }
        debug!(added, ?kind, "loaded rules");
        Ok(())
    }

    /// Loads a JSON rule table.
    ///
    /// Accepts an object mapping each source to its information object,
    /// or an array of `[source, information]` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::InvalidLoadArgument`] before adding anything
    /// when the table has another shape; otherwise as
    /// [`RuleBook::load`].
    pub fn load_json(&mut self, table: &Value, kind: SourceKind) -> Result<()> {
        let entries = match table {
            Value::Object(entries) => entries
                .iter()
                .map(|(source, information)| entry(source, information))
                .collect::<Result<Vec<_>>>()?,
            Value::Array(pairs) => pairs.iter().map(pair).collect::<Result<Vec<_>>>()?,
            other => {
                return Err(RuleError::InvalidLoadArgument(format!(
                    "expected an object or an array of rules, got {}",
                    type_name(other)
                )));
            }
        };
        self.load(entries, kind)
    }

    /// Finds the first matching rule and returns its information merged
    /// with the named captures. Captures win over information keys.
    pub fn matching<S: Routable + ?Sized>(&self, subject: &S) -> Option<MatchResult> {
        self.find(subject).map(|(_, result)| result)
    }

    /// Like [`RuleBook::matching`], then binds the result onto `target`:
    /// the matched rule is recorded and every result key is written to the
    /// target's parameters.
    pub fn bind<T: Bindable + ?Sized>(&self, target: &mut T) -> Option<MatchResult> {
        let (rule, result) = self.find(&*target)?;

        target.set_matched_rule(Arc::clone(rule));
        for (key, value) in &result {
            target.set_parameter(key, value.clone());
        }

        Some(result)
    }

    fn find<S: Routable + ?Sized>(&self, subject: &S) -> Option<(&Arc<Rule>, MatchResult)> {
        self.rules.iter().find_map(|rule| {
            let found = rule.matches(subject);
            found.matched.then(|| {
                let mut result = rule.information().clone();
                result.extend(found.captures);
                (rule, result)
            })
        })
    }

    /// All rules, in insertion order.
    pub fn all(&self) -> &[Arc<Rule>] {
        &self.rules
    }

    /// Iterates over the rules in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Arc<Rule>> {
        self.rules.iter()
    }

    /// Whether a structurally identical rule is present.
    pub fn contains(&self, rule: &Rule) -> bool {
        self.hashes.contains(rule.hash())
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if the book holds no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<'a> IntoIterator for &'a RuleBook {
    type Item = &'a Arc<Rule>;
    type IntoIter = std::slice::Iter<'a, Arc<Rule>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn entry(source: &str, information: &Value) -> Result<(String, Information)> {
    match information {
        Value::Object(information) => Ok((source.to_string(), information.clone())),
        other => Err(RuleError::InvalidLoadArgument(format!(
            "information for `{source}` must be an object, got {}",
            type_name(other)
        ))),
    }
}

fn pair(value: &Value) -> Result<(String, Information)> {
    match value.as_array().map(Vec::as_slice) {
        Some([Value::String(source), information]) => entry(source, information),
        _ => Err(RuleError::InvalidLoadArgument(format!(
            "expected a [source, information] pair, got {value}"
        ))),
    }
}

const fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
