// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;
use yare::parameterized;

fn chain(value: serde_json::Value) -> ContextChain {
    ContextChain::new(value)
}

#[test]
fn renders_simple_substitution() {
    let context = chain(json!({"project": {"name": "demo"}}));
    let rendered = render_template("Project: {{project.name}}", &context, &[]).unwrap();
    assert_eq!(rendered, "Project: demo");
}

#[test]
fn renders_sections_and_lists() {
    let context = chain(json!({
        "categories": [
            {"name": "docs", "patterns_str": "`*.md`"},
            {"name": "specs", "patterns_str": "`*.yaml`"}
        ]
    }));
    let template = "{{#each categories}}- {{name}}: {{patterns_str}}\n{{/each}}";
    let rendered = render_template(template, &context, &[]).unwrap();
    assert_eq!(rendered, "- docs: `*.md`\n- specs: `*.yaml`\n");
}

#[test]
fn chain_layers_resolve_during_render() {
    let system = chain(json!({"os": "linux", "style": "system"}));
    let project = chain(json!({"style": "project"})).new_child(&system);

    let rendered = render_template("{{style}} on {{os}}", &project, &[]).unwrap();
    assert_eq!(rendered, "project on linux");
}

#[test]
fn partials_render() {
    let context = chain(json!({"name": "demo"}));
    let partials = vec![("header".to_string(), "== {{name}} ==".to_string())];
    let rendered = render_template("{{> header}} body", &context, &partials).unwrap();
    assert_eq!(rendered, "== demo == body");
}

#[test]
fn output_is_not_html_escaped() {
    let context = chain(json!({"patterns": "`*.md` & \"docs\""}));
    let rendered = render_template("{{patterns}}", &context, &[]).unwrap();
    assert_eq!(rendered, "`*.md` & \"docs\"");
}

#[test]
fn render_error_includes_line_context() {
    let template = "line one\n{{#each}}broken\n";
    let error = render_template(template, &chain(json!({})), &[]).unwrap_err();
    assert!(!error.message.is_empty());
}

#[parameterized(
    satisfied = { "1.2.3", "1.2.0", true },
    exact = { "1.2.0", "1.2.0", true },
    below = { "1.2.3", "2.0.0", false },
    v_prefixes = { "v1.2.3", "v1.2.0", true },
    unparsable_current = { "unknown", "1.0.0", false },
    unparsable_minimum = { "1.0.0", "latest", false },
    empty = { "", "1.0.0", false },
)]
fn version_comparison(current: &str, minimum: &str, expected: bool) {
    assert_eq!(version_at_least(current, minimum), expected);
}

#[test]
fn has_version_helper_gates_blocks() {
    let context = chain(json!({"openspec": {"version": "1.2.3"}}));

    let rendered = render_template(
        "{{#has_version \"1.2.0\"}}modern{{else}}legacy{{/has_version}}",
        &context,
        &[],
    )
    .unwrap();
    assert_eq!(rendered, "modern");

    let rendered = render_template(
        "{{#has_version \"2.0.0\"}}modern{{else}}legacy{{/has_version}}",
        &context,
        &[],
    )
    .unwrap();
    assert_eq!(rendered, "legacy");
}

#[test]
fn has_version_helper_fails_without_version() {
    let rendered = render_template(
        "{{#has_version \"1.0.0\"}}yes{{else}}no{{/has_version}}",
        &chain(json!({})),
        &[],
    )
    .unwrap();
    assert_eq!(rendered, "no");
}
