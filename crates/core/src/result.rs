// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire-level tool results.
//!
//! Every tool and prompt returns a JSON-serialised [`ToolResult`]. Errors are
//! values at this boundary; the pipeline converts internal failures into
//! structured results with a closed error vocabulary.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Closed vocabulary of error kinds surfaced to the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ValidationError,
    NoProject,
    NotFound,
    FileReadError,
    TemplateError,
    Security,
    ConfigReadError,
    ConfigWriteError,
    Safeguard,
    InvalidName,
    Context,
    UnexpectedError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ValidationError => "validation_error",
            ErrorKind::NoProject => "no_project",
            ErrorKind::NotFound => "not_found",
            ErrorKind::FileReadError => "file_read_error",
            ErrorKind::TemplateError => "template_error",
            ErrorKind::Security => "security",
            ErrorKind::ConfigReadError => "config_read_error",
            ErrorKind::ConfigWriteError => "config_write_error",
            ErrorKind::Safeguard => "safeguard",
            ErrorKind::InvalidName => "invalid_name",
            ErrorKind::Context => "context",
            ErrorKind::UnexpectedError => "unexpected_error",
        }
    }
}

/// Instruction telling the agent to render content without acting on it.
pub const INSTRUCTION_DISPLAY_ONLY: &str = "display_only";

/// Instruction attached to argument-validation failures.
pub const INSTRUCTION_VALIDATION_ERROR: &str =
    "Check the tool arguments against the schema and retry once with corrected values.";

/// Instruction attached to not-found failures.
pub const INSTRUCTION_NOT_FOUND: &str =
    "The requested item does not exist. Do not retry with the same name.";

/// Instruction attached when no project is set.
pub const INSTRUCTION_NO_PROJECT: &str =
    "No project is active. Ask the user which project to use, then call set_project.";

/// Instruction attached to template rendering failures.
pub const INSTRUCTION_TEMPLATE_ERROR: &str =
    "The template could not be rendered. Report the error to the user; do not retry.";

/// Instruction attached to safeguard refusals.
pub const INSTRUCTION_SAFEGUARD: &str =
    "This operation was refused as a safeguard. Do not retry without explicit user approval.";

/// Structured result returned by every tool and prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_agent_instructions: Option<String>,
}

impl ToolResult {
    /// Successful result carrying a value.
    pub fn ok(value: impl Into<Value>) -> Self {
        Self {
            success: true,
            value: Some(value.into()),
            error: None,
            error_type: None,
            error_data: None,
            message: None,
            instruction: None,
            additional_agent_instructions: None,
        }
    }

    /// Failed result with an error message and kind.
    pub fn failure(error: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            success: false,
            value: None,
            error: Some(error.into()),
            error_type: Some(kind),
            error_data: None,
            message: None,
            instruction: None,
            additional_agent_instructions: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = Some(instruction.into());
        self
    }

    pub fn with_error_data(mut self, data: Value) -> Self {
        self.error_data = Some(data);
        self
    }

    /// Serialise for the wire. Serialisation of this shape cannot fail, but
    /// a fallback error result is produced rather than panicking.
    pub fn to_json_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(
                "{{\"success\":false,\"error\":\"result serialisation failed: {}\",\"error_type\":\"unexpected_error\"}}",
                e
            )
        })
    }
}

#[cfg(test)]
#[path = "result_tests.rs"]
mod tests;
