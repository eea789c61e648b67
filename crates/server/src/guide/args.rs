// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command argument parsing for the guide prompt.
//!
//! Supported forms: `--flag`, `--flag=value`, `key=value`, and bare
//! positionals. Flag keys are stored with a leading underscore to keep them
//! distinct from `key=value` pairs.

use indexmap::IndexMap;
use serde_json::Value;

/// Parse the argv tail (everything after the command token) into kwargs,
/// positionals, and parse errors.
pub fn parse_command_arguments(
    argv: &[String],
) -> (IndexMap<String, Value>, Vec<String>, Vec<String>) {
    let mut kwargs = IndexMap::new();
    let mut positional = Vec::new();
    let mut errors = Vec::new();

    for token in argv {
        if let Some(flag) = token.strip_prefix("--") {
            if flag.is_empty() {
                errors.push("empty flag name: '--'".to_string());
                continue;
            }
            match flag.split_once('=') {
                Some((key, _)) if key.is_empty() => {
                    errors.push(format!("empty flag name in '{}'", token));
                }
                Some((key, value)) => {
                    kwargs.insert(format!("_{}", key), Value::String(value.to_string()));
                }
                None => {
                    kwargs.insert(format!("_{}", flag), Value::Bool(true));
                }
            }
            continue;
        }

        if let Some((key, value)) = token.split_once('=') {
            if key.is_empty() {
                errors.push(format!("empty key in '{}'", token));
            } else {
                kwargs.insert(key.to_string(), Value::String(value.to_string()));
            }
            continue;
        }

        positional.push(token.clone());
    }

    (kwargs, positional, errors)
}

#[cfg(test)]
#[path = "args_tests.rs"]
mod tests;
