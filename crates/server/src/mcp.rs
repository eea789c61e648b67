// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! MCP protocol surface.
//!
//! Exposes the tool registry and the `guide` prompt over the Model Context
//! Protocol. Every request runs inside a task-local session scope.

use crate::guide::{build_argv, route_guide, MAX_PROMPT_ARGS};
use crate::session::session_scope;
use crate::state::ServerState;
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, GetPromptRequestParam, GetPromptResult,
    ListPromptsResult, ListToolsResult, PaginatedRequestParam, Prompt, PromptArgument,
    PromptMessage, PromptMessageRole, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::{RequestContext, RoleServer};
use rmcp::{Error as McpError, ServerHandler};
use std::borrow::Cow;
use std::sync::Arc;
use tracing::debug;

/// Names of the guide prompt's fifteen optional positional arguments.
const PROMPT_ARG_NAMES: [&str; MAX_PROMPT_ARGS] = [
    "arg1", "arg2", "arg3", "arg4", "arg5", "arg6", "arg7", "arg8", "arg9", "argA", "argB",
    "argC", "argD", "argE", "argF",
];

#[derive(Clone)]
pub struct GuidepostService {
    state: Arc<ServerState>,
}

impl GuidepostService {
    pub fn new(state: Arc<ServerState>) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &Arc<ServerState> {
        &self.state
    }
}

impl ServerHandler for GuidepostService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_prompts()
                .build(),
            instructions: Some(
                "Guidepost serves project documentation and configuration. \
                 Invoke the guide prompt for content and commands; callback \
                 tools deliver requested filesystem observations back to the \
                 server."
                    .to_string(),
            ),
            ..ServerInfo::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        let tools = self
            .state
            .registry
            .list()
            .into_iter()
            .map(|(name, description, schema)| {
                let input_schema = match schema {
                    serde_json::Value::Object(map) => Arc::new(map),
                    _ => Arc::new(serde_json::Map::new()),
                };
                Tool::new(
                    Cow::<'static, str>::Owned(name),
                    Cow::<'static, str>::Owned(description),
                    input_schema,
                )
            })
            .collect();
        Ok(ListToolsResult {
            meta: None,
            tools,
            next_cursor: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let state = Arc::clone(&self.state);
        let args = serde_json::Value::Object(request.arguments.unwrap_or_default());
        let name = request.name.to_string();

        let response = session_scope(async move {
            state.registry.invoke(&state, &name, args).await
        })
        .await;

        match response {
            Some(json) => Ok(CallToolResult::success(vec![Content::text(json)])),
            None => Err(McpError::invalid_params(
                format!("unknown tool: {}", request.name),
                None,
            )),
        }
    }

    async fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListPromptsResult, McpError> {
        let arguments = PROMPT_ARG_NAMES
            .iter()
            .map(|name| PromptArgument {
                name: name.to_string(),
                title: None,
                description: None,
                required: Some(false),
            })
            .collect();

        Ok(ListPromptsResult {
            meta: None,
            prompts: vec![Prompt::new(
                "guide",
                Some("Access guide content and commands."),
                Some(arguments),
            )],
            next_cursor: None,
        })
    }

    async fn get_prompt(
        &self,
        request: GetPromptRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<GetPromptResult, McpError> {
        if request.name != "guide" {
            return Err(McpError::invalid_params(
                format!("unknown prompt: {}", request.name),
                None,
            ));
        }

        let arguments = request.arguments.unwrap_or_default();
        let raw: Vec<Option<String>> = PROMPT_ARG_NAMES
            .iter()
            .map(|name| {
                arguments
                    .get(*name)
                    .and_then(|value| value.as_str())
                    .map(String::from)
            })
            .collect();
        let argv = build_argv(&raw);
        debug!(argc = argv.len() - 1, "guide prompt invoked");

        let state = Arc::clone(&self.state);
        let json = session_scope(async move {
            state.manager.clone().on_tool().await;
            let result = route_guide(&state, &argv).await;
            let result = state.manager.process_result(result, None).await;
            result.to_json_string()
        })
        .await;

        Ok(GetPromptResult {
            description: Some("Guide response".to_string()),
            messages: vec![PromptMessage::new_text(PromptMessageRole::User, json)],
        })
    }
}
