// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    simple = { "help" },
    nested = { "create/category" },
    dashed = { "list-projects" },
    trimmed = { "  status  " },
)]
fn valid_paths_pass(raw: &str) {
    assert_eq!(validate_command_path(raw).unwrap(), raw.trim());
}

#[parameterized(
    empty = { "" },
    blank = { "   " },
    traversal = { "../etc/passwd" },
    nested_traversal = { "help/../../secrets" },
    absolute = { "/etc/passwd" },
    backslash_absolute = { "\\windows\\system32" },
    drive_letter = { "C:\\temp\\cmd" },
    newline = { "help\nrm -rf" },
    tab = { "help\tx" },
    semicolon = { "help;rm" },
    pipe = { "help|cat" },
    subshell = { "help$(whoami)" },
    backtick = { "help`id`" },
    redirect = { "help>out" },
)]
fn invalid_paths_are_rejected(raw: &str) {
    assert!(validate_command_path(raw).is_err());
}

#[test]
fn traversal_with_backslash_separators_is_rejected() {
    assert!(validate_command_path("a\\..\\b").is_err());
}
