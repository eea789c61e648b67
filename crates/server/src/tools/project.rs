// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project tools: set, get, list, clone.

use crate::pipeline::{ToolOutput, ToolRegistry};
use crate::session::get_or_create_session;
use crate::state::ServerState;
use gp_config::{ConfigError, Project};
use gp_core::result::{INSTRUCTION_NO_PROJECT, INSTRUCTION_NOT_FOUND, INSTRUCTION_SAFEGUARD};
use gp_core::{ErrorKind, ToolResult};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SetProjectArgs {
    /// Project name to set or create
    pub name: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetProjectArgs {
    /// Include full category and collection details
    #[serde(default)]
    pub verbose: bool,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListProjectsArgs {
    /// Include full details for each project
    #[serde(default)]
    pub verbose: bool,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CloneProjectArgs {
    /// Project to copy from
    pub source: String,
    /// Project to create or merge into
    pub target: String,
    /// Overwrite an existing target
    #[serde(default)]
    pub force: bool,
}

fn config_failure(e: ConfigError) -> ToolResult {
    match e {
        ConfigError::InvalidName(message) => {
            ToolResult::failure(message, ErrorKind::InvalidName)
        }
        ConfigError::Validation(message) => {
            ToolResult::failure(message, ErrorKind::ValidationError)
        }
        ConfigError::Write(_) | ConfigError::Serialise(_) => {
            ToolResult::failure(e.to_string(), ErrorKind::ConfigWriteError)
        }
        other => ToolResult::failure(other.to_string(), ErrorKind::ConfigReadError),
    }
}

pub(crate) fn project_summary(project: &Project, verbose: bool) -> Value {
    if !verbose {
        return json!({
            "name": project.name,
            "categories": project.categories.len(),
            "collections": project.collections.len(),
        });
    }
    json!({
        "name": project.name,
        "key": project.key,
        "hash": project.hash,
        "categories": project.categories.iter().map(|(name, c)| json!({
            "name": name,
            "dir": c.dir,
            "patterns": c.patterns,
            "description": c.description,
        })).collect::<Vec<_>>(),
        "collections": project.collections.iter().map(|(name, c)| json!({
            "name": name,
            "categories": c.categories,
            "description": c.description,
        })).collect::<Vec<_>>(),
        "flags": project.project_flags.iter()
            .map(|(k, v)| (k.clone(), serde_json::to_value(v).unwrap_or(Value::Null)))
            .collect::<serde_json::Map<_, _>>(),
        "openspec_version": project.openspec_version,
        "openspec_validated": project.openspec_validated,
    })
}

async fn set_project(state: Arc<ServerState>, args: SetProjectArgs) -> ToolOutput {
    let session = match get_or_create_session(&state, Some(&args.name)).await {
        Ok(session) => session,
        Err(e) => return config_failure(e).into(),
    };
    *state.default_project.lock() = Some(args.name.clone());

    match session.project().await {
        Ok(project) => ToolResult::ok(project_summary(&project, false))
            .with_message(format!("Project '{}' active", project.name))
            .into(),
        Err(e) => config_failure(e).into(),
    }
}

async fn get_project(state: Arc<ServerState>, args: GetProjectArgs) -> ToolOutput {
    let session = match get_or_create_session(&state, None).await {
        Ok(session) => session,
        Err(_) => {
            return ToolResult::failure(
                "No current project set. Please specify a project name.",
                ErrorKind::NoProject,
            )
            .with_instruction(INSTRUCTION_NO_PROJECT)
            .into();
        }
    };
    match session.project().await {
        Ok(project) => {
            let mut value = project_summary(&project, args.verbose);
            if let Value::Object(map) = &mut value {
                map.insert("project".to_string(), json!(project.name));
            }
            ToolResult::ok(value).into()
        }
        Err(e) => config_failure(e).into(),
    }
}

async fn list_projects(state: Arc<ServerState>, args: ListProjectsArgs) -> ToolOutput {
    match state.config.all_projects().await {
        Ok(all) => {
            if !args.verbose {
                let mut names: Vec<&String> = all.keys().collect();
                names.sort();
                return ToolResult::ok(json!({ "projects": names })).into();
            }
            let mut names: Vec<&String> = all.keys().collect();
            names.sort();
            let detailed: serde_json::Map<String, Value> = names
                .into_iter()
                .map(|name| (name.clone(), project_summary(&all[name], true)))
                .collect();
            ToolResult::ok(json!({ "projects": detailed })).into()
        }
        Err(e) => ToolResult::failure(
            format!("Failed to read configuration: {}", e),
            ErrorKind::ConfigReadError,
        )
        .into(),
    }
}

async fn clone_project(state: Arc<ServerState>, args: CloneProjectArgs) -> ToolOutput {
    let all = match state.config.all_projects().await {
        Ok(all) => all,
        Err(e) => {
            return ToolResult::failure(
                format!("Failed to read configuration: {}", e),
                ErrorKind::ConfigReadError,
            )
            .into();
        }
    };

    let Some(source) = all.get(&args.source) else {
        return ToolResult::failure(
            format!("Project '{}' not found", args.source),
            ErrorKind::NotFound,
        )
        .with_instruction(INSTRUCTION_NOT_FOUND)
        .into();
    };

    if all.contains_key(&args.target) && !args.force {
        return ToolResult::failure(
            format!(
                "Project '{}' already exists; pass force to overwrite",
                args.target
            ),
            ErrorKind::Safeguard,
        )
        .with_instruction(INSTRUCTION_SAFEGUARD)
        .into();
    }

    let mut cloned = match Project::new(&args.target) {
        Ok(project) => project,
        Err(e) => return config_failure(e).into(),
    };
    cloned.categories = source.categories.clone();
    cloned.collections = source.collections.clone();
    cloned.project_flags = source.project_flags.clone();
    cloned.allowed_write_paths = source.allowed_write_paths.clone();
    cloned.additional_read_paths = source.additional_read_paths.clone();

    if let Err(e) = state.config.save_project(&cloned).await {
        return config_failure(e).into();
    }

    ToolResult::ok(project_summary(&cloned, false))
        .with_message(format!("Cloned '{}' into '{}'", args.source, args.target))
        .into()
}

pub fn register(registry: &ToolRegistry) {
    registry.add::<SetProjectArgs, _, _>(
        "set_project",
        "Set or create the active project by name.",
        set_project,
    );
    registry.add::<GetProjectArgs, _, _>(
        "get_project",
        "Get the active project's configuration.",
        get_project,
    );
    registry.add::<ListProjectsArgs, _, _>(
        "list_projects",
        "List all configured projects.",
        list_projects,
    );
    registry.add::<CloneProjectArgs, _, _>(
        "clone_project",
        "Clone one project's configuration into another.",
        clone_project,
    );
}
