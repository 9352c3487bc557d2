#![allow(dead_code)]

use oxide_rulebook::{Information, Rule, RuleBook, SourceKind};
use serde_json::Value;

pub fn info(value: Value) -> Information {
    match value {
        Value::Object(map) => map,
        other => panic!("Expected an object, got {other}"),
    }
}

pub fn template(source: &str, information: Value) -> Rule {
    Rule::template(source, info(information))
        .unwrap_or_else(|e| panic!("Failed to build rule: {source}\nError: {e:?}"))
}

pub fn book(json: &str) -> RuleBook {
    RuleBook::from_json_str(json, SourceKind::Template)
        .unwrap_or_else(|e| panic!("Failed to load rules: {json}\nError: {e:?}"))
}

/// Installs a test subscriber so rule book tracing shows up with `--nocapture`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}
