// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow file parsing.
//!
//! The workflow file is project-owned markdown naming the current phase,
//! tracked issue, and queued work:
//!
//! ```markdown
//! **Phase**: implement
//! **Issue**: add-auth
//! Tracking: GH-42
//! Description: login endpoint hardening
//!
//! Queue:
//! - refresh-tokens
//! - rate-limits
//! ```
//!
//! Keys are matched case-insensitively at line start; bold markers and list
//! dashes are tolerated.

use gp_core::WorkflowState;

/// Parse workflow state from file content. Returns `None` when the content
/// carries neither a phase nor an issue.
pub fn parse_workflow_state(content: &str) -> Option<WorkflowState> {
    let mut state = WorkflowState::default();
    let mut in_queue = false;

    for line in content.lines() {
        let stripped = strip_markers(line);
        if stripped.is_empty() {
            in_queue = false;
            continue;
        }

        if in_queue {
            if let Some(item) = line.trim().strip_prefix("- ") {
                state.queue.push(item.trim().to_string());
                continue;
            }
            in_queue = false;
        }

        if let Some(value) = key_value(&stripped, "phase") {
            state.phase = non_empty(value);
        } else if let Some(value) = key_value(&stripped, "issue") {
            state.issue = non_empty(value);
        } else if let Some(value) = key_value(&stripped, "tracking") {
            state.tracking = non_empty(value);
        } else if let Some(value) = key_value(&stripped, "description") {
            state.description = non_empty(value);
        } else if stripped.to_lowercase().starts_with("queue") {
            in_queue = true;
        }
    }

    if state.phase.is_none() && state.issue.is_none() {
        return None;
    }
    Some(state)
}

fn strip_markers(line: &str) -> String {
    line.trim()
        .trim_start_matches("- ")
        .trim_start_matches('#')
        .replace("**", "")
        .trim()
        .to_string()
}

fn key_value(line: &str, key: &str) -> Option<String> {
    let lower = line.to_lowercase();
    let prefix = format!("{}:", key);
    if lower.starts_with(&prefix) {
        Some(line[prefix.len()..].trim().to_string())
    } else {
        None
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
