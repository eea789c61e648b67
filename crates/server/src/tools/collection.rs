// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Collection tools: list, add, remove, update.

use crate::pipeline::{ToolOutput, ToolRegistry};
use crate::session::get_or_create_session;
use crate::state::ServerState;
use gp_config::{validate_collection_name, validate_description, Collection, ConfigError, Session};
use gp_core::result::INSTRUCTION_NOT_FOUND;
use gp_core::{ErrorKind, ToolResult};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CollectionListArgs {
    /// Project name; defaults to the active project
    #[serde(default)]
    pub project: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CollectionAddArgs {
    /// Collection name
    pub name: String,
    /// Categories (or collections) this collection references
    #[serde(default)]
    pub categories: Vec<String>,
    /// Short description
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub project: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CollectionRemoveArgs {
    /// Collection name to remove
    pub name: String,
    #[serde(default)]
    pub project: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CollectionUpdateArgs {
    /// Collection name to update
    pub name: String,
    /// Replacement category list, when changing it
    #[serde(default)]
    pub categories: Option<Vec<String>>,
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

async fn collection_list(state: Arc<ServerState>, args: CollectionListArgs) -> ToolOutput {
    let session = match session_for(&state, args.project.as_deref()).await {
        Ok(session) => session,
        Err(failure) => return failure.into(),
    };
    match session.project().await {
        Ok(project) => {
            let collections: Vec<_> = project
                .collections
                .iter()
                .map(|(name, c)| {
                    json!({
                        "name": name,
                        "categories": c.categories,
                        "description": c.description,
                    })
                })
                .collect();
            ToolResult::ok(json!({ "collections": collections })).into()
        }
        Err(e) => failure_from(e).into(),
    }
}

async fn collection_add(state: Arc<ServerState>, args: CollectionAddArgs) -> ToolOutput {
    if let Err(e) = validate_collection_name(&args.name) {
        return failure_from(e).into();
    }
    if let Err(e) = validate_description(&args.description) {
        return failure_from(e).into();
    }

    let session = match session_for(&state, args.project.as_deref()).await {
        Ok(session) => session,
        Err(failure) => return failure.into(),
    };

    let exists = match session.project().await {
        Ok(project) => project.collections.contains_key(&args.name),
        Err(e) => return failure_from(e).into(),
    };
    if exists {
        return ToolResult::failure(
            format!("Collection '{}' already exists", args.name),
            ErrorKind::ValidationError,
        )
        .into();
    }

    let name = args.name.clone();
    let collection = Collection {
        categories: args.categories,
        description: args.description,
    };
    // Referenced categories are checked by the project validation that
    // runs inside update_config.
    let update = session
        .update_config(move |mut project| {
            project.collections.insert(name, collection);
            project
        })
        .await;

    match update {
        Ok(()) => ToolResult::ok(json!({"collection": args.name}))
            .with_message(format!("Collection '{}' added", args.name))
            .into(),
        Err(e) => failure_from(e).into(),
    }
}

async fn collection_remove(state: Arc<ServerState>, args: CollectionRemoveArgs) -> ToolOutput {
    let session = match session_for(&state, args.project.as_deref()).await {
        Ok(session) => session,
        Err(failure) => return failure.into(),
    };

    let exists = match session.project().await {
        Ok(project) => project.collections.contains_key(&args.name),
        Err(e) => return failure_from(e).into(),
    };
    if !exists {
        return ToolResult::failure(
            format!("Collection '{}' not found", args.name),
            ErrorKind::NotFound,
        )
        .with_instruction(INSTRUCTION_NOT_FOUND)
        .into();
    }

    let name = args.name.clone();
    let update = session
        .update_config(move |mut project| {
            project.collections.shift_remove(&name);
            for collection in project.collections.values_mut() {
                collection.categories.retain(|c| c != &name);
            }
            project
        })
        .await;

    match update {
        Ok(()) => ToolResult::ok(json!({"collection": args.name}))
            .with_message(format!("Collection '{}' removed", args.name))
            .into(),
        Err(e) => failure_from(e).into(),
    }
}

async fn collection_update(state: Arc<ServerState>, args: CollectionUpdateArgs) -> ToolOutput {
    if let Some(description) = &args.description {
        if let Err(e) = validate_description(description) {
            return failure_from(e).into();
        }
    }

    let session = match session_for(&state, args.project.as_deref()).await {
        Ok(session) => session,
        Err(failure) => return failure.into(),
    };

    let exists = match session.project().await {
        Ok(project) => project.collections.contains_key(&args.name),
        Err(e) => return failure_from(e).into(),
    };
    if !exists {
        return ToolResult::failure(
            format!("Collection '{}' not found", args.name),
            ErrorKind::NotFound,
        )
        .with_instruction(INSTRUCTION_NOT_FOUND)
        .into();
    }

    let name = args.name.clone();
    let categories = args.categories;
    let description = args.description;
    let update = session
        .update_config(move |mut project| {
            if let Some(collection) = project.collections.get_mut(&name) {
                if let Some(categories) = categories {
                    collection.categories = categories;
                }
                if let Some(description) = description {
                    collection.description = description;
                }
            }
            project
        })
        .await;

    match update {
        Ok(()) => ToolResult::ok(json!({"collection": args.name}))
            .with_message(format!("Collection '{}' updated", args.name))
            .into(),
        Err(e) => failure_from(e).into(),
    }
}

pub fn register(registry: &ToolRegistry) {
    registry.add::<CollectionListArgs, _, _>(
        "collection_list",
        "List the project's collections.",
        collection_list,
    );
    registry.add::<CollectionAddArgs, _, _>(
        "collection_add",
        "Add a collection referencing existing categories.",
        collection_add,
    );
    registry.add::<CollectionRemoveArgs, _, _>(
        "collection_remove",
        "Remove a collection.",
        collection_remove,
    );
    registry.add::<CollectionUpdateArgs, _, _>(
        "collection_update",
        "Update a collection's categories or description.",
        collection_update,
    );
}
