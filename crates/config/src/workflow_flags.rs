// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow flag interpretation.
//!
//! The `workflow` flag is either a boolean (default phases) or a list of
//! phase names. `workflow-file` may contain `{project_name}`-style
//! placeholders; `workflow-consent` maps phase names to entry/exit consent
//! requirements.

use crate::model::FlagValue;

/// Workflow file consulted when the `workflow-file` flag is unset.
pub const DEFAULT_WORKFLOW_FILE: &str = "WORKFLOW.md";

/// Phases used when the `workflow` flag is simply `true`.
pub const DEFAULT_WORKFLOW_PHASES: &[&str] = &["discussion", "plan", "implement", "review"];

/// Parsed `workflow` flag.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WorkflowPhases {
    pub enabled: bool,
    pub phases: Vec<String>,
}

/// Interpret the `workflow` flag value.
pub fn parse_workflow_phases(value: &FlagValue) -> WorkflowPhases {
    match value {
        FlagValue::Bool(true) => WorkflowPhases {
            enabled: true,
            phases: DEFAULT_WORKFLOW_PHASES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        },
        FlagValue::List(phases) if !phases.is_empty() => WorkflowPhases {
            enabled: true,
            phases: phases.clone(),
        },
        _ => WorkflowPhases::default(),
    }
}

/// Substitute `{project_name}`, `{project_key}`, `{project_hash}` in a
/// workflow file path.
pub fn substitute_variables(template: &str, name: &str, key: &str, hash: &str) -> String {
    template
        .replace("{project_name}", name)
        .replace("{project_key}", key)
        .replace("{project_hash}", hash)
}

#[cfg(test)]
#[path = "workflow_flags_tests.rs"]
mod tests;
