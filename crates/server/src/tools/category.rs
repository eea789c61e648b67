// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Category tools: list, add, remove, update.

use crate::pipeline::{ToolOutput, ToolRegistry};
use crate::session::get_or_create_session;
use crate::state::ServerState;
use gp_config::{
    validate_category_name, validate_description, validate_patterns, Category, ConfigError,
    Session,
};
use gp_core::result::INSTRUCTION_NOT_FOUND;
use gp_core::{ErrorKind, ToolResult};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CategoryListArgs {
    /// Project name; defaults to the active project
    #[serde(default)]
    pub project: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CategoryAddArgs {
    /// Category name
    pub name: String,
    /// Directory relative to the docroot
    pub dir: String,
    /// Glob patterns selecting files within the directory
    #[serde(default)]
    pub patterns: Vec<String>,
    /// Short description
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub project: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CategoryRemoveArgs {
    /// Category name to remove
    pub name: String,
    #[serde(default)]
    pub project: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CategoryUpdateArgs {
    /// Category name to update
    pub name: String,
    /// New directory, when changing it
    #[serde(default)]
    pub dir: Option<String>,
    /// Replacement pattern list, when changing it
    #[serde(default)]
    pub patterns: Option<Vec<String>>,
    /// New description, when changing it
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub project: Option<String>,
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

async fn session_for(
    state: &Arc<ServerState>,
    project: Option<&str>,
) -> Result<Arc<Session>, ToolResult> {
    get_or_create_session(state, project).await.map_err(failure_from)
}

async fn category_list(state: Arc<ServerState>, args: CategoryListArgs) -> ToolOutput {
    let session = match session_for(&state, args.project.as_deref()).await {
        Ok(session) => session,
        Err(failure) => return failure.into(),
    };
    match session.project().await {
        Ok(project) => {
            let categories: Vec<_> = project
                .categories
                .iter()
                .map(|(name, c)| {
                    json!({
                        "name": name,
                        "dir": c.dir,
                        "patterns": c.patterns,
                        "description": c.description,
                    })
                })
                .collect();
            ToolResult::ok(json!({ "categories": categories })).into()
        }
        Err(e) => failure_from(e).into(),
    }
}

async fn category_add(state: Arc<ServerState>, args: CategoryAddArgs) -> ToolOutput {
    if let Err(e) = validate_category_name(&args.name) {
        return failure_from(e).into();
    }
    if let Err(e) = validate_description(&args.description) {
        return failure_from(e).into();
    }
    if let Err(e) = validate_patterns(&args.patterns) {
        return failure_from(e).into();
    }

    let session = match session_for(&state, args.project.as_deref()).await {
        Ok(session) => session,
        Err(failure) => return failure.into(),
    };

    let exists = match session.project().await {
        Ok(project) => project.categories.contains_key(&args.name),
        Err(e) => return failure_from(e).into(),
    };
    if exists {
        return ToolResult::failure(
            format!("Category '{}' already exists", args.name),
            ErrorKind::ValidationError,
        )
        .into();
    }

    let name = args.name.clone();
    let category = Category {
        dir: args.dir,
        patterns: args.patterns,
        description: args.description,
    };
    let update = session
        .update_config(move |mut project| {
            project.categories.insert(name, category);
            project
        })
        .await;

    match update {
        Ok(()) => ToolResult::ok(json!({"category": args.name}))
            .with_message(format!("Category '{}' added", args.name))
            .into(),
        Err(e) => failure_from(e).into(),
    }
}

async fn category_remove(state: Arc<ServerState>, args: CategoryRemoveArgs) -> ToolOutput {
    let session = match session_for(&state, args.project.as_deref()).await {
        Ok(session) => session,
        Err(failure) => return failure.into(),
    };

    let exists = match session.project().await {
        Ok(project) => project.categories.contains_key(&args.name),
        Err(e) => return failure_from(e).into(),
    };
    if !exists {
        return ToolResult::failure(
            format!("Category '{}' not found", args.name),
            ErrorKind::NotFound,
        )
        .with_instruction(INSTRUCTION_NOT_FOUND)
        .into();
    }

    // Removing a category also drops it from every collection that
    // references it, keeping the config consistent.
    let name = args.name.clone();
    let update = session
        .update_config(move |mut project| {
            project.categories.shift_remove(&name);
            for collection in project.collections.values_mut() {
                collection.categories.retain(|c| c != &name);
            }
            project
        })
        .await;

    match update {
        Ok(()) => ToolResult::ok(json!({"category": args.name}))
            .with_message(format!("Category '{}' removed", args.name))
            .into(),
        Err(e) => failure_from(e).into(),
    }
}

async fn category_update(state: Arc<ServerState>, args: CategoryUpdateArgs) -> ToolOutput {
    if let Some(description) = &args.description {
        if let Err(e) = validate_description(description) {
            return failure_from(e).into();
        }
    }
    if let Some(patterns) = &args.patterns {
        if let Err(e) = validate_patterns(patterns) {
            return failure_from(e).into();
        }
    }

    let session = match session_for(&state, args.project.as_deref()).await {
        Ok(session) => session,
        Err(failure) => return failure.into(),
    };

    let exists = match session.project().await {
        Ok(project) => project.categories.contains_key(&args.name),
        Err(e) => return failure_from(e).into(),
    };
    if !exists {
        return ToolResult::failure(
            format!("Category '{}' not found", args.name),
            ErrorKind::NotFound,
        )
        .with_instruction(INSTRUCTION_NOT_FOUND)
        .into();
    }

    let name = args.name.clone();
    let dir = args.dir;
    let patterns = args.patterns;
    let description = args.description;
    let update = session
        .update_config(move |mut project| {
            if let Some(category) = project.categories.get_mut(&name) {
                if let Some(dir) = dir {
                    category.dir = dir;
                }
                if let Some(patterns) = patterns {
                    category.patterns = patterns;
                }
                if let Some(description) = description {
                    category.description = description;
                }
            }
            project
        })
        .await;

    match update {
        Ok(()) => ToolResult::ok(json!({"category": args.name}))
            .with_message(format!("Category '{}' updated", args.name))
            .into(),
        Err(e) => failure_from(e).into(),
    }
}

pub fn register(registry: &ToolRegistry) {
    registry.add::<CategoryListArgs, _, _>(
        "category_list",
        "List the project's categories.",
        category_list,
    );
    registry.add::<CategoryAddArgs, _, _>(
        "category_add",
        "Add a category to the project.",
        category_add,
    );
    registry.add::<CategoryRemoveArgs, _, _>(
        "category_remove",
        "Remove a category and its collection references.",
        category_remove,
    );
    registry.add::<CategoryUpdateArgs, _, _>(
        "category_update",
        "Update a category's directory, patterns, or description.",
        category_update,
    );
}
