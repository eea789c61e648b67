// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn bool_true_enables_default_phases() {
    let parsed = parse_workflow_phases(&FlagValue::Bool(true));
    assert!(parsed.enabled);
    assert_eq!(parsed.phases, DEFAULT_WORKFLOW_PHASES);
}

#[test]
fn bool_false_disables() {
    assert!(!parse_workflow_phases(&FlagValue::Bool(false)).enabled);
}

#[test]
fn list_supplies_custom_phases() {
    let value = FlagValue::List(vec!["design".to_string(), "build".to_string()]);
    let parsed = parse_workflow_phases(&value);
    assert!(parsed.enabled);
    assert_eq!(parsed.phases, ["design", "build"]);
}

#[test]
fn empty_list_disables() {
    assert!(!parse_workflow_phases(&FlagValue::List(vec![])).enabled);
}

#[test]
fn string_value_does_not_enable() {
    assert!(!parse_workflow_phases(&FlagValue::Str("yes".to_string())).enabled);
}

#[test]
fn substitutes_project_placeholders() {
    let result = substitute_variables(
        ".guidepost/{project_name}-{project_hash}.md",
        "demo",
        "demo",
        "abcd1234",
    );
    assert_eq!(result, ".guidepost/demo-abcd1234.md");
}
