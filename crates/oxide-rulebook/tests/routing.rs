//! End-to-end resolution through a rule book.

mod common;
use common::*;

use std::sync::Arc;

use oxide_rulebook::{Request, RuleBook, RuleError};
use serde_json::json;

const API_RULES: &str = r#"{
    "GET /api/{model}/{id:\\d+}": { "action": "show" },
    "GET /api/{model}": { "action": "list" },
    "/api/{model}/{id}": { "action": "fallback" },
    "/{page}.{format:xml|json}": { "action": "export" },
    "/docs/{path*}": { "action": "docs" }
}"#;

#[test]
fn method_constraint_selects_rule() {
    init_tracing();
    let book = book(API_RULES);

    let show = book.matching(&Request::get("/api/users/4")).unwrap();
    assert_eq!(show["action"], "show");
    assert_eq!(show["method"], "GET");
    assert_eq!(show["model"], "users");
    assert_eq!(show["id"], "4");
}

#[test]
fn unmatched_method_falls_through() {
    let book = book(API_RULES);

    let result = book.matching(&Request::put("/api/users/4")).unwrap();
    assert_eq!(result["action"], "fallback");
    assert!(!result.contains_key("method"));
}

#[test]
fn verb_prefixes_on_same_path_are_duplicates() {
    let mut book = RuleBook::new();
    book.add(template("GET /api/{model}", json!({}))).unwrap();

    let err = book.add(template("POST /api/{model}", json!({}))).unwrap_err();
    assert_eq!(err.rule().unwrap().method(), Some("POST"));
    assert_eq!(book.len(), 1);
}

#[test]
fn typed_groups_reject_other_values() {
    let book = book(API_RULES);

    let result = book.matching(&Request::get("/api/users/abc")).unwrap();
    assert_eq!(result["action"], "fallback");
    assert_eq!(result["id"], "abc");
}

#[test]
fn custom_format() {
    let book = book(API_RULES);

    let result = book.matching("/users.xml").unwrap();
    assert_eq!(result["action"], "export");
    assert_eq!(result["page"], "users");
    assert_eq!(result["format"], "xml");

    assert!(book.matching("/users.html").is_none());
}

#[test]
fn any_group_takes_rest_of_path() {
    let book = book(API_RULES);
    let result = book.matching("/docs/guide/routing.md").unwrap();
    assert_eq!(result["path"], "guide/routing.md");
}

#[test]
fn anchored_matching() {
    let book = book(r#"{ "/api/{model}/{id}": {} }"#);
    assert!(book.matching("/api/users/324").is_some());
    assert!(book.matching("/api/users/324/extra").is_none());
    assert!(book.matching("prefix/api/users/324").is_none());
}

#[test]
fn bind_writes_result_onto_request() {
    let book = book(API_RULES);
    let mut request = Request::get("/api/users/4");

    let result = book.bind(&mut request).unwrap();

    assert_eq!(request.params.len(), result.len());
    for (key, value) in &result {
        assert_eq!(request.params.get(key), Some(value));
    }
    assert!(Arc::ptr_eq(request.matched_rule().unwrap(), &book.all()[0]));
}

#[test]
fn duplicate_error_carries_rule() {
    let mut book = RuleBook::new();
    let kept = book
        .add(template("/api/{model}/{id}", json!({ "n": 1 })))
        .unwrap();

    match book.add(template("/api/{a}/{b}", json!({ "n": 2 }))) {
        Err(RuleError::DuplicateRule { rule }) => {
            assert_eq!(rule.information()["n"], 2);
            assert_eq!(rule.template_source(), Some("/api/{a}/{b}"));
            assert_eq!(rule.hash(), kept.hash());
        }
        other => panic!("Expected DuplicateRule, got {other:?}"),
    }
}

/// A caller-defined target with its own parameter storage.
#[derive(Default)]
struct Dispatch {
    path: String,
    rule: Option<Arc<oxide_rulebook::Rule>>,
    seen: Vec<(String, serde_json::Value)>,
}

impl oxide_rulebook::Routable for Dispatch {
    fn path(&self) -> &str {
        &self.path
    }

    fn method(&self) -> Option<&str> {
        None
    }
}

impl oxide_rulebook::Bindable for Dispatch {
    fn set_matched_rule(&mut self, rule: Arc<oxide_rulebook::Rule>) {
        self.rule = Some(rule);
    }

    fn set_parameter(&mut self, key: &str, value: serde_json::Value) {
        self.seen.push((key.to_string(), value));
    }
}

#[test]
fn bind_into_custom_target() {
    let book = book(API_RULES);
    let mut target = Dispatch {
        path: "/docs/a/b".to_string(),
        ..Dispatch::default()
    };

    book.bind(&mut target).unwrap();

    assert_eq!(target.rule.unwrap().information()["action"], "docs");
    assert_eq!(
        target.seen,
        [
            ("action".to_string(), json!("docs")),
            ("path".to_string(), json!("a/b")),
        ]
    );
}
