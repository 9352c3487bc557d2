//! Rule books shared between threads.

mod common;
use common::*;

use std::sync::{Arc, RwLock};
use std::thread;

use oxide_rulebook::{Request, RuleBook, SharedRuleBook};
use serde_json::json;

#[test]
fn concurrent_inserts_keep_book_duplicate_free() {
    let shared: SharedRuleBook = Arc::new(RwLock::new(RuleBook::new()));

    thread::scope(|scope| {
        for worker in 0..4 {
            let shared = Arc::clone(&shared);
            scope.spawn(move || {
                for n in 0..8 {
                    let rule = template(&format!("/r{n}/{{w{worker}}}"), json!({ "n": n }));
                    let _ = shared.write().unwrap().add(rule);
                }
            });
        }
    });

    let book = shared.read().unwrap();
    assert_eq!(book.len(), 8);
}

#[test]
fn concurrent_matching_on_stable_book() {
    let shared: SharedRuleBook = Arc::new(RwLock::new(book(
        r#"{ "GET /users/{id}": { "action": "show" } }"#,
    )));

    thread::scope(|scope| {
        for id in 0..4 {
            let shared = Arc::clone(&shared);
            scope.spawn(move || {
                let mut request = Request::get(format!("/users/{id}"));
                let result = shared.read().unwrap().bind(&mut request).unwrap();
                assert_eq!(result["id"], id.to_string());
                assert_eq!(request.params.get_str("action"), Some("show"));
            });
        }
    });
}
