// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[test]
fn ok_result_serialises_without_error_fields() {
    let json = ToolResult::ok("done").to_json_string();
    let value: Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["success"], true);
    assert_eq!(value["value"], "done");
    assert!(value.get("error").is_none());
    assert!(value.get("error_type").is_none());
    assert!(value.get("additional_agent_instructions").is_none());
}

#[test]
fn failure_carries_kind_and_instruction() {
    let result = ToolResult::failure("missing category", ErrorKind::NotFound)
        .with_instruction(INSTRUCTION_NOT_FOUND);
    let value: Value = serde_json::from_str(&result.to_json_string()).unwrap();

    assert_eq!(value["success"], false);
    assert_eq!(value["error"], "missing category");
    assert_eq!(value["error_type"], "not_found");
    assert_eq!(value["instruction"], INSTRUCTION_NOT_FOUND);
}

#[parameterized(
    validation = { ErrorKind::ValidationError, "validation_error" },
    no_project = { ErrorKind::NoProject, "no_project" },
    security = { ErrorKind::Security, "security" },
    config_read = { ErrorKind::ConfigReadError, "config_read_error" },
    config_write = { ErrorKind::ConfigWriteError, "config_write_error" },
    safeguard = { ErrorKind::Safeguard, "safeguard" },
    invalid_name = { ErrorKind::InvalidName, "invalid_name" },
    unexpected = { ErrorKind::UnexpectedError, "unexpected_error" },
)]
fn error_kinds_serialise_snake_case(kind: ErrorKind, expected: &str) {
    assert_eq!(kind.as_str(), expected);
    let json = serde_json::to_value(kind).unwrap();
    assert_eq!(json, expected);
}

#[test]
fn round_trips_through_json() {
    let original = ToolResult::ok(serde_json::json!({"projects": ["a", "b"]}))
        .with_message("two projects")
        .with_instruction(INSTRUCTION_DISPLAY_ONLY);

    let parsed: ToolResult = serde_json::from_str(&original.to_json_string()).unwrap();
    assert_eq!(parsed, original);
}
