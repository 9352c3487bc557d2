//! Request-like values the rule book reads from and binds into.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::rule::Rule;

/// HTTP request methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET method
    Get,
    /// POST method
    Post,
    /// PUT method
    Put,
    /// PATCH method
    Patch,
    /// DELETE method
    Delete,
    /// HEAD method
    Head,
    /// OPTIONS method
    Options,
}

impl Method {
    /// Parses a method from a string, ignoring case.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "PATCH" => Some(Self::Patch),
            "DELETE" => Some(Self::Delete),
            "HEAD" => Some(Self::Head),
            "OPTIONS" => Some(Self::Options),
            _ => None,
        }
    }

    /// Returns the method as a string.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ordered string-keyed parameter store.
///
/// Keys keep their first insertion position; setting an existing key
/// replaces the value in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Parameters {
    values: Map<String, Value>,
}

impl Parameters {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a parameter.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Gets a parameter value, `None` when the key is missing.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Gets a parameter value when it is a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Checks if a parameter exists.
    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Number of stored parameters.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` when no parameter is stored.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over the parameters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Anything a rule can be tested against.
pub trait Routable {
    /// The path to match.
    fn path(&self) -> &str;

    /// The request method, if the subject carries one.
    ///
    /// Subjects without a method are never rejected by a rule's
    /// method constraint.
    fn method(&self) -> Option<&str>;
}

/// A routable subject that accepts the outcome of a match.
pub trait Bindable: Routable {
    /// Records the rule that matched this subject.
    fn set_matched_rule(&mut self, rule: Arc<Rule>);

    /// Stores one key of the match result.
    fn set_parameter(&mut self, key: &str, value: Value);
}

impl Routable for str {
    fn path(&self) -> &str {
        self
    }

    fn method(&self) -> Option<&str> {
        None
    }
}

impl Routable for String {
    fn path(&self) -> &str {
        self
    }

    fn method(&self) -> Option<&str> {
        None
    }
}

/// A minimal request: method, path and the parameters bound by a match.
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP method.
    pub method: Method,
    /// Request path.
    pub path: String,
    /// Parameters written by [`RuleBook::bind`](crate::RuleBook::bind).
    pub params: Parameters,
    matched_rule: Option<Arc<Rule>>,
}

impl Request {
    /// Creates a new request.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: Parameters::new(),
            matched_rule: None,
        }
    }

    /// Creates a GET request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    /// Creates a POST request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    /// Creates a PUT request.
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    /// Creates a DELETE request.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// The rule this request was last bound to.
    pub fn matched_rule(&self) -> Option<&Arc<Rule>> {
        self.matched_rule.as_ref()
    }
}

impl Routable for Request {
    fn path(&self) -> &str {
        &self.path
    }

    fn method(&self) -> Option<&str> {
        Some(self.method.as_str())
    }
}

impl Bindable for Request {
    fn set_matched_rule(&mut self, rule: Arc<Rule>) {
        self.matched_rule = Some(rule);
    }

    fn set_parameter(&mut self, key: &str, value: Value) {
        self.params.set(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_method_parsing() {
        assert_eq!(Method::parse("GET"), Some(Method::Get));
        assert_eq!(Method::parse("post"), Some(Method::Post));
        assert_eq!(Method::parse("INVALID"), None);
    }

    #[test]
    fn test_method_display() {
        assert_eq!(Method::Delete.to_string(), "DELETE");
    }

    #[test]
    fn test_parameters() {
        let mut params = Parameters::new();
        params.set("id", "123");
        params.set("page", 2);

        assert!(params.has("id"));
        assert_eq!(params.get_str("id"), Some("123"));
        assert_eq!(params.get("page"), Some(&json!(2)));
        assert_eq!(params.get("missing"), None);
        assert!(!params.has("missing"));
    }

    #[test]
    fn test_parameters_keep_insertion_order() {
        let mut params = Parameters::new();
        params.set("b", "1");
        params.set("a", "2");
        params.set("b", "3");

        let keys: Vec<&str> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["b", "a"]);
        assert_eq!(params.get_str("b"), Some("3"));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_request_builder() {
        let req = Request::put("/users/4");

        assert_eq!(req.method, Method::Put);
        assert_eq!(Routable::path(&req), "/users/4");
        assert_eq!(Routable::method(&req), Some("PUT"));
        assert!(req.params.is_empty());
        assert!(req.matched_rule().is_none());
    }

    #[test]
    fn test_strings_have_no_method() {
        assert_eq!("/users".method(), None);
        assert_eq!(String::from("/users").path(), "/users");
    }
}
