// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

#[test]
fn get_walks_child_first() {
    let base = ContextChain::new(json!({"a": 1, "b": 2}));
    let child = ContextChain::new(json!({"b": 20, "c": 30})).new_child(&base);

    assert_eq!(child.get("a"), Some(&json!(1)));
    assert_eq!(child.get("b"), Some(&json!(20)));
    assert_eq!(child.get("c"), Some(&json!(30)));
    assert_eq!(child.get("missing"), None);
}

#[test]
fn parent_is_unaffected_by_child() {
    let base = ContextChain::new(json!({"x": "base"}));
    let _child = ContextChain::new(json!({"x": "child"})).new_child(&base);
    assert_eq!(base.get("x"), Some(&json!("base")));
}

#[test]
fn flatten_merges_with_child_precedence() {
    let system = ContextChain::new(json!({"os": "linux", "shared": "system"}));
    let project = ContextChain::new(json!({"project": "demo", "shared": "project"}));
    let chain = project.new_child(&system);

    let flat = chain.flatten();
    assert_eq!(flat["os"], "linux");
    assert_eq!(flat["project"], "demo");
    assert_eq!(flat["shared"], "project");
}

#[test]
fn three_level_chain_resolves_in_order() {
    let system = ContextChain::new(json!({"level": "system", "sys": true}));
    let agent = ContextChain::new(json!({"level": "agent", "ag": true})).new_child(&system);
    let transient = ContextChain::new(json!({"level": "transient"})).new_child(&agent);

    assert_eq!(transient.get("level"), Some(&json!("transient")));
    assert_eq!(transient.get("ag"), Some(&json!(true)));
    assert_eq!(transient.get("sys"), Some(&json!(true)));
}

#[test]
fn non_object_value_yields_empty_chain() {
    let chain = ContextChain::new(json!("just a string"));
    assert_eq!(chain.get("anything"), None);
    assert_eq!(chain.flatten(), json!({}));
}
