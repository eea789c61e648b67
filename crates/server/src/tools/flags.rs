// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Feature-flag tools over the global and project stores.

use crate::pipeline::{ToolOutput, ToolRegistry};
use crate::session::get_or_create_session;
use crate::state::ServerState;
use gp_config::{resolve_flag, ConfigError, FlagValue};
use gp_core::{ErrorKind, ToolResult};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum FlagScope {
    Global,
    Project,
}

impl Default for FlagScope {
    fn default() -> Self {
        Self::Global
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FlagSetArgs {
    /// Flag name
    pub name: String,
    /// Flag value: bool, string, string list, or string map
    pub value: Value,
    /// Store to write: global or project
    #[serde(default)]
    pub scope: FlagScope,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FlagGetArgs {
    /// Flag name; resolution is project override first, then global
    pub name: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FlagRemoveArgs {
    /// Flag name
    pub name: String,
    /// Store to remove from: global or project
    #[serde(default)]
    pub scope: FlagScope,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FlagListArgs {
    /// Store to list: global or project
    #[serde(default)]
    pub scope: FlagScope,
}

fn failure_from(e: ConfigError) -> ToolResult {
    match e {
        ConfigError::InvalidName(message) => ToolResult::failure(message, ErrorKind::InvalidName),
        ConfigError::Validation(message) => {
            ToolResult::failure(message, ErrorKind::ValidationError)
        }
        ConfigError::Write(_) | ConfigError::Serialise(_) => {
            ToolResult::failure(e.to_string(), ErrorKind::ConfigWriteError)
        }
        other => ToolResult::failure(other.to_string(), ErrorKind::ConfigReadError),
    }
}

fn parse_flag_value(value: Value) -> Result<FlagValue, ToolResult> {
    serde_json::from_value(value).map_err(|_| {
        ToolResult::failure(
            "Flag value must be a bool, string, string list, or string map",
            ErrorKind::ValidationError,
        )
    })
}

async fn flag_set(state: Arc<ServerState>, args: FlagSetArgs) -> ToolOutput {
    let value = match parse_flag_value(args.value) {
        Ok(value) => value,
        Err(failure) => return failure.into(),
    };
    let session = match get_or_create_session(&state, None).await {
        Ok(session) => session,
        Err(e) => return failure_from(e).into(),
    };

    let outcome = match args.scope {
        FlagScope::Global => session.feature_flags().set(&args.name, value).await,
        FlagScope::Project => session.project_flags().set(&args.name, value).await,
    };
    match outcome {
        Ok(()) => ToolResult::ok(json!({"flag": args.name}))
            .with_message(format!("Flag '{}' set", args.name))
            .into(),
        Err(e) => failure_from(e).into(),
    }
}

async fn flag_get(state: Arc<ServerState>, args: FlagGetArgs) -> ToolOutput {
    let session = match get_or_create_session(&state, None).await {
        Ok(session) => session,
        Err(e) => return failure_from(e).into(),
    };
    match resolve_flag(&session, &args.name).await {
        Ok(value) => ToolResult::ok(json!({
            "flag": args.name,
            "value": value.map(|v| serde_json::to_value(v).unwrap_or(Value::Null)),
        }))
        .into(),
        Err(e) => failure_from(e).into(),
    }
}

async fn flag_remove(state: Arc<ServerState>, args: FlagRemoveArgs) -> ToolOutput {
    let session = match get_or_create_session(&state, None).await {
        Ok(session) => session,
        Err(e) => return failure_from(e).into(),
    };
    let outcome = match args.scope {
        FlagScope::Global => session.feature_flags().remove(&args.name).await,
        FlagScope::Project => session.project_flags().remove(&args.name).await,
    };
    match outcome {
        Ok(removed) => ToolResult::ok(json!({"flag": args.name, "removed": removed})).into(),
        Err(e) => failure_from(e).into(),
    }
}

async fn flag_list(state: Arc<ServerState>, args: FlagListArgs) -> ToolOutput {
    let session = match get_or_create_session(&state, None).await {
        Ok(session) => session,
        Err(e) => return failure_from(e).into(),
    };
    let flags = match args.scope {
        FlagScope::Global => session.feature_flags().list().await,
        FlagScope::Project => session.project_flags().list().await,
    };
    match flags {
        Ok(flags) => {
            let values: serde_json::Map<String, Value> = flags
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::to_value(v).unwrap_or(Value::Null)))
                .collect();
            ToolResult::ok(json!({ "flags": values })).into()
        }
        Err(e) => failure_from(e).into(),
    }
}

pub fn register(registry: &ToolRegistry) {
    registry.add::<FlagSetArgs, _, _>("flag_set", "Set a feature flag.", flag_set);
    registry.add::<FlagGetArgs, _, _>(
        "flag_get",
        "Get a feature flag, resolving project overrides first.",
        flag_get,
    );
    registry.add::<FlagRemoveArgs, _, _>("flag_remove", "Remove a feature flag.", flag_remove);
    registry.add::<FlagListArgs, _, _>("flag_list", "List feature flags in a store.", flag_list);
}
