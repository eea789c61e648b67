// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command discovery and execution against docroot templates.

use crate::session::get_or_create_session;
use crate::state::ServerState;
use gp_core::result::{INSTRUCTION_DISPLAY_ONLY, INSTRUCTION_TEMPLATE_ERROR};
use gp_core::{ErrorKind, ToolResult};
use gp_render::{
    discover_category_files, parse_frontmatter, render_template, resolve_file_with_extensions,
    ContextChain, TemplateContextCache,
};
use indexmap::IndexMap;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

const COMMANDS_DIR: &str = "commands";

/// Metadata for one discovered command.
#[derive(Debug, Clone)]
pub struct CommandInfo {
    pub name: String,
    pub description: String,
    pub aliases: Vec<String>,
    pub category: String,
    pub usage: Option<String>,
    pub examples: Vec<String>,
}

/// Discover commands under the docroot commands directory by reading each
/// template's frontmatter.
pub fn discover_commands(commands_dir: &Path) -> Vec<CommandInfo> {
    let files = match discover_category_files(commands_dir, &["**/*".to_string()]) {
        Ok(files) => files,
        Err(_) => return Vec::new(),
    };

    let mut commands = Vec::new();
    for file in files {
        let Ok(raw) = std::fs::read_to_string(&file.path) else {
            continue;
        };
        let (frontmatter, _) = parse_frontmatter(&raw);
        let frontmatter = frontmatter.unwrap_or_default();

        let name = file
            .name
            .strip_suffix(".md")
            .unwrap_or(&file.name)
            .to_string();
        commands.push(CommandInfo {
            name,
            description: frontmatter.string("description").unwrap_or_default(),
            aliases: frontmatter.string_list("aliases"),
            category: frontmatter
                .string("category")
                .unwrap_or_else(|| "general".to_string()),
            usage: frontmatter.string("usage"),
            examples: frontmatter.string_list("examples"),
        });
    }
    commands
}

/// Resolve an alias to the command it names, or return the path unchanged.
pub fn resolve_command_alias(command_path: &str, commands: &[CommandInfo]) -> String {
    commands
        .iter()
        .find(|cmd| cmd.aliases.iter().any(|alias| alias == command_path))
        .map(|cmd| cmd.name.clone())
        .unwrap_or_else(|| command_path.to_string())
}

/// Render help text for a command from its discovered metadata.
pub fn command_help(command_path: &str, commands: &[CommandInfo]) -> Option<String> {
    let command = commands
        .iter()
        .find(|cmd| cmd.name == command_path || cmd.aliases.iter().any(|a| a == command_path))?;

    let mut help = format!("# {}\n\n", command.name);
    if !command.description.is_empty() {
        help.push_str(&format!("{}\n\n", command.description));
    }
    if let Some(usage) = &command.usage {
        help.push_str(&format!("**Usage:** {}\n\n", usage));
    }
    if !command.aliases.is_empty() {
        help.push_str(&format!("**Aliases:** {}\n\n", command.aliases.join(", ")));
    }
    if !command.examples.is_empty() {
        help.push_str("**Examples:**\n");
        for example in &command.examples {
            help.push_str(&format!("- {}\n", example));
        }
    }
    Some(help)
}

fn validate_command_arguments(
    frontmatter: &gp_render::Frontmatter,
    kwargs: &IndexMap<String, Value>,
    args: &[String],
) -> Option<ToolResult> {
    let required_args = frontmatter.required_args();
    if args.len() < required_args.len() {
        let missing = required_args[args.len()..].join(", ");
        return Some(
            ToolResult::failure(
                format!("Missing required arguments: {}", missing),
                ErrorKind::ValidationError,
            )
            .with_instruction(INSTRUCTION_DISPLAY_ONLY),
        );
    }

    let missing: Vec<String> = frontmatter
        .required_kwargs()
        .into_iter()
        .filter(|key| !kwargs.contains_key(key) && !kwargs.contains_key(&format!("_{}", key)))
        .collect();
    if !missing.is_empty() {
        return Some(
            ToolResult::failure(
                format!("Missing required options: {}", missing.join(", ")),
                ErrorKind::ValidationError,
            )
            .with_instruction(INSTRUCTION_DISPLAY_ONLY),
        );
    }

    None
}

fn build_command_context(
    base: &ContextChain,
    command_path: &str,
    file_path: &Path,
    kwargs: &IndexMap<String, Value>,
    args: &[String],
    commands: &[CommandInfo],
) -> ContextChain {
    // Flag keys lose their marker underscore for template access
    let template_kwargs: serde_json::Map<String, Value> = kwargs
        .iter()
        .map(|(key, value)| {
            let clean = key.strip_prefix('_').unwrap_or(key).to_string();
            (clean, value.clone())
        })
        .collect();
    let raw_kwargs: serde_json::Map<String, Value> = kwargs
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    let commands_value: Vec<Value> = commands
        .iter()
        .map(|cmd| {
            json!({
                "name": cmd.name,
                "description": cmd.description,
                "aliases": cmd.aliases,
                "category": cmd.category,
            })
        })
        .collect();

    // Group commands by category, title-cased for display
    let mut categories: IndexMap<String, Vec<Value>> = IndexMap::new();
    for cmd in commands {
        categories
            .entry(cmd.category.clone())
            .or_default()
            .push(json!({"name": cmd.name, "description": cmd.description}));
    }
    let mut category_names: Vec<&String> = categories.keys().collect();
    category_names.sort();
    let command_categories: Vec<Value> = category_names
        .into_iter()
        .map(|name| {
            json!({
                "name": name,
                "title": format!("{} Commands", title_case(name)),
                "commands": categories[name],
            })
        })
        .collect();

    let command_context = ContextChain::new(json!({
        "kwargs": template_kwargs,
        "raw_kwargs": raw_kwargs,
        "args": args,
        "command": {
            "name": command_path,
            "path": file_path.to_string_lossy(),
        },
        "commands": commands_value,
        "command_categories": command_categories,
    }));
    command_context.new_child(base)
}

fn title_case(name: &str) -> String {
    name.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Execute a command: discover, resolve aliases, validate, render.
pub async fn handle_command(
    state: &Arc<ServerState>,
    command_path: &str,
    kwargs: IndexMap<String, Value>,
    args: Vec<String>,
) -> ToolResult {
    let session = match get_or_create_session(state, None).await {
        Ok(session) => session,
        Err(e) => return ToolResult::failure(e.to_string(), ErrorKind::Context),
    };

    let commands_dir = session.docroot().join(COMMANDS_DIR);
    if !commands_dir.is_dir() {
        return ToolResult::failure(
            format!("Commands directory not found: {}", COMMANDS_DIR),
            ErrorKind::NotFound,
        );
    }

    let commands = discover_commands(&commands_dir);

    if kwargs.get("_help").is_some() {
        return match command_help(command_path, &commands) {
            Some(help) => ToolResult::ok(help).with_instruction(INSTRUCTION_DISPLAY_ONLY),
            None => ToolResult::failure(
                format!("Command not found: {}", command_path),
                ErrorKind::NotFound,
            ),
        };
    }

    let resolved = resolve_command_alias(command_path, &commands);
    debug!(command = %resolved, "executing command");

    let Some(file_path) = resolve_file_with_extensions(&commands_dir.join(&resolved)) else {
        return ToolResult::failure(
            format!("Command not found: {}", command_path),
            ErrorKind::NotFound,
        );
    };

    let raw = match tokio::fs::read_to_string(&file_path).await {
        Ok(raw) => raw,
        Err(e) => {
            return ToolResult::failure(
                format!("Error reading command file: {}", e),
                ErrorKind::FileReadError,
            );
        }
    };
    let (frontmatter, body) = parse_frontmatter(&raw);
    let frontmatter = frontmatter.unwrap_or_default();

    if let Some(failure) = validate_command_arguments(&frontmatter, &kwargs, &args) {
        return failure;
    }

    let base = state
        .context_cache
        .template_contexts(&session, &state.manager, None, None)
        .await;
    let mut chain = build_command_context(&base, &resolved, &file_path, &kwargs, &args, &commands);
    chain = TemplateContextCache::transient_context().new_child(&chain);

    match render_template(&body, &chain, &[]) {
        Ok(rendered) => {
            let instruction = match frontmatter.instruction() {
                Some(template) => render_template(&template, &chain, &[])
                    .unwrap_or_else(|_| INSTRUCTION_DISPLAY_ONLY.to_string()),
                None => INSTRUCTION_DISPLAY_ONLY.to_string(),
            };
            ToolResult::ok(rendered).with_instruction(instruction)
        }
        Err(e) => ToolResult::failure(
            format!("Template rendering failed: {}", e),
            ErrorKind::TemplateError,
        )
        .with_instruction(INSTRUCTION_TEMPLATE_ERROR),
    }
}
