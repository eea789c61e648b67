// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The guide prompt router.
//!
//! `guide` is the single user-facing prompt. Its argv is routed either to a
//! docroot command (`:`/`;` prefix) or to content retrieval.

pub mod args;
pub mod commands;
pub mod security;

use crate::content::get_content;
use crate::state::ServerState;
use args::parse_command_arguments;
use gp_core::result::INSTRUCTION_DISPLAY_ONLY;
use gp_core::{ErrorKind, ToolResult};
use security::validate_command_path;
use std::sync::Arc;
use tracing::debug;

/// MCP prompt handlers take a fixed argument list; fifteen optional
/// positionals is the protocol ceiling.
pub const MAX_PROMPT_ARGS: usize = 15;

/// Build the argv list from the prompt's optional arguments, stopping at
/// the first absent one.
pub fn build_argv(raw: &[Option<String>]) -> Vec<String> {
    let mut argv = vec!["guide".to_string()];
    for arg in raw {
        match arg {
            Some(value) => argv.push(value.clone()),
            None => break,
        }
    }
    argv
}

/// Route a guide request to the command or content handler.
pub async fn route_guide(state: &Arc<ServerState>, argv: &[String]) -> ToolResult {
    if argv.len() <= 1 || (argv.len() == 2 && argv[1].is_empty()) {
        return ToolResult::failure("Requires 1 or more arguments", ErrorKind::ValidationError)
            .with_instruction(INSTRUCTION_DISPLAY_ONLY);
    }

    let first = &argv[1];
    if first.starts_with(':') || first.starts_with(';') {
        handle_command_request(state, argv).await
    } else {
        handle_content_request(state, argv).await
    }
}

async fn handle_command_request(state: &Arc<ServerState>, argv: &[String]) -> ToolResult {
    let raw_path = &argv[1][1..];
    if raw_path.is_empty() {
        return ToolResult::failure("Command name cannot be empty", ErrorKind::ValidationError)
            .with_instruction(INSTRUCTION_DISPLAY_ONLY);
    }

    let command_path = match validate_command_path(raw_path) {
        Ok(path) => path,
        Err(reason) => {
            return ToolResult::failure(
                format!("Security validation failed: {}", reason),
                ErrorKind::Security,
            )
            .with_instruction(INSTRUCTION_DISPLAY_ONLY);
        }
    };

    let (kwargs, positional, errors) = parse_command_arguments(&argv[2..]);
    if !errors.is_empty() {
        return ToolResult::failure(
            format!("Argument parsing failed: {}", errors.join("; ")),
            ErrorKind::ValidationError,
        )
        .with_instruction(INSTRUCTION_DISPLAY_ONLY);
    }

    debug!(command = %command_path, "guide command request");
    commands::handle_command(state, &command_path, kwargs, positional).await
}

async fn handle_content_request(state: &Arc<ServerState>, argv: &[String]) -> ToolResult {
    let expression = argv[1..].join(",");
    debug!(expression = %expression, "guide content request");
    let mut result = get_content(state, &expression).await;
    result.instruction = Some(INSTRUCTION_DISPLAY_ONLY.to_string());
    result
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
