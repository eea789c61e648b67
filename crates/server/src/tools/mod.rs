// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Business tools: thin consumers of the session core.

pub mod category;
pub mod collection;
pub mod flags;
pub mod project;

use crate::pipeline::ToolRegistry;

/// Register every tool surface (business tools + callbacks) into the
/// deferred registry.
pub fn register_all(registry: &ToolRegistry) {
    project::register(registry);
    category::register(registry);
    collection::register(registry);
    flags::register(registry);
    crate::callbacks::register(registry);
    content_tool::register(registry);
}

mod content_tool {
    use crate::content::get_content;
    use crate::pipeline::{ToolOutput, ToolRegistry};
    use crate::state::ServerState;
    use schemars::JsonSchema;
    use serde::Deserialize;
    use std::sync::Arc;

    #[derive(Debug, Deserialize, JsonSchema)]
    pub struct GetContentArgs {
        /// Comma-separated category and collection names
        pub expression: String,
    }

    pub fn register(registry: &ToolRegistry) {
        registry.add::<GetContentArgs, _, _>(
            "get_content",
            "Retrieve documentation content by category or collection name.",
            |state: Arc<ServerState>, args: GetContentArgs| async move {
                ToolOutput::from(get_content(&state, &args.expression).await)
            },
        );
    }
}
