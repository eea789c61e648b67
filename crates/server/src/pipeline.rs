// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tool registry and invocation pipeline.
//!
//! Tools are added to a deferred registry at startup and exposed to the MCP
//! server in one `register` pass, so the server instance can be created
//! after tool modules are wired. The invocation wrapper logs, fans
//! `on_tool` out to tasks, validates arguments, runs the body, and folds
//! pending task state into the response.

use crate::state::ServerState;
use gp_core::result::INSTRUCTION_VALIDATION_ERROR;
use gp_core::{ErrorKind, EventData, EventType, ToolResult};
use indexmap::IndexMap;
use parking_lot::Mutex;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{debug, error, trace};

/// Tool name prefix from `MCP_TOOL_PREFIX`. Default `guide`; a blank value
/// disables prefixing.
pub fn tool_prefix() -> String {
    std::env::var("MCP_TOOL_PREFIX").unwrap_or_else(|_| "guide".to_string())
}

/// Apply the environment prefix, or an explicit per-tool override.
pub fn prefixed_name(name: &str, prefix_override: Option<&str>) -> String {
    let prefix = match prefix_override {
        Some(prefix) => prefix.to_string(),
        None => tool_prefix(),
    };
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}_{}", prefix, name)
    }
}

/// A tool body's product: the result, plus an event to dispatch through the
/// post-hook (callback tools only).
pub struct ToolOutput {
    pub result: ToolResult,
    pub event: Option<(EventType, EventData)>,
}

impl ToolOutput {
    pub fn with_event(result: ToolResult, event_type: EventType, data: EventData) -> Self {
        Self {
            result,
            event: Some((event_type, data)),
        }
    }
}

impl From<ToolResult> for ToolOutput {
    fn from(result: ToolResult) -> Self {
        Self {
            result,
            event: None,
        }
    }
}

type ToolFuture = Pin<Box<dyn Future<Output = ToolOutput> + Send>>;
type ToolHandler = Arc<dyn Fn(Arc<ServerState>, Value) -> ToolFuture + Send + Sync>;

struct ToolDef {
    description: String,
    input_schema: Value,
    handler: ToolHandler,
}

/// Deferred, idempotent tool registry.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Mutex<IndexMap<String, ToolDef>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a typed tool. Registration is idempotent per name; a duplicate
    /// is logged and skipped.
    pub fn add<A, F, Fut>(&self, name: &str, description: &str, body: F)
    where
        A: DeserializeOwned + JsonSchema + Send + 'static,
        F: Fn(Arc<ServerState>, A) -> Fut + Send + Sync + Clone + 'static,
        Fut: Future<Output = ToolOutput> + Send + 'static,
    {
        self.add_with_prefix::<A, F, Fut>(name, description, None, body)
    }

    pub fn add_with_prefix<A, F, Fut>(
        &self,
        name: &str,
        description: &str,
        prefix_override: Option<&str>,
        body: F,
    ) where
        A: DeserializeOwned + JsonSchema + Send + 'static,
        F: Fn(Arc<ServerState>, A) -> Fut + Send + Sync + Clone + 'static,
        Fut: Future<Output = ToolOutput> + Send + 'static,
    {
        let full_name = prefixed_name(name, prefix_override);
        let mut tools = self.tools.lock();
        if tools.contains_key(&full_name) {
            trace!(tool = %full_name, "already registered, skipping");
            return;
        }

        let schema = schemars::schema_for!(A);
        let input_schema = serde_json::to_value(schema).unwrap_or_else(|_| json!({}));

        let handler: ToolHandler = Arc::new(move |state, value| {
            let body = body.clone();
            Box::pin(async move {
                match parse_args::<A>(value) {
                    Ok(args) => body(state, args).await,
                    Err(failure) => failure.into(),
                }
            })
        });

        tools.insert(
            full_name.clone(),
            ToolDef {
                description: description.to_string(),
                input_schema,
                handler,
            },
        );
        debug!(tool = %full_name, "tool registered");
    }

    /// Names, descriptions, and schemas for the MCP tool listing.
    pub fn list(&self) -> Vec<(String, String, Value)> {
        self.tools
            .lock()
            .iter()
            .map(|(name, def)| (name.clone(), def.description.clone(), def.input_schema.clone()))
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.lock().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run the full pipeline for a named tool. Returns `None` for unknown
    /// names.
    pub async fn invoke(
        &self,
        state: &Arc<ServerState>,
        name: &str,
        args: Value,
    ) -> Option<String> {
        let handler = {
            let tools = self.tools.lock();
            tools.get(name).map(|def| Arc::clone(&def.handler))
        }?;

        debug!(tool = name, "invoking tool");
        state.manager.clone().on_tool().await;

        let output = handler(Arc::clone(state), args).await;
        if !output.result.success {
            error!(tool = name, error = ?output.result.error, "tool failed");
        }

        let result = state
            .manager
            .process_result(output.result, output.event)
            .await;
        debug!(tool = name, success = result.success, "tool completed");
        Some(result.to_json_string())
    }
}

/// Validate raw arguments against a typed args struct, packaging failures
/// as structured validation errors.
pub fn parse_args<A: DeserializeOwned>(value: Value) -> Result<A, ToolResult> {
    serde_json::from_value(value).map_err(|e| {
        ToolResult::failure(
            format!("Invalid tool arguments: {}", e),
            ErrorKind::ValidationError,
        )
        .with_instruction(INSTRUCTION_VALIDATION_ERROR)
        .with_error_data(json!({"validation_errors": [{"message": e.to_string()}]}))
    })
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
