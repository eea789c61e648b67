// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Content retrieval by category and collection names.

use crate::session::get_or_create_session;
use crate::state::ServerState;
use gp_config::Project;
use gp_core::result::INSTRUCTION_NOT_FOUND;
use gp_core::{ErrorKind, ToolResult};
use gp_render::{
    discover_category_files, is_template_path, parse_frontmatter, render_template,
    TemplateContextCache,
};
use indexmap::IndexMap;
use serde_json::json;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Resolve a comma-separated expression of category and collection names
/// into rendered content.
///
/// A name may resolve to a category, a collection, or both; files are
/// de-duplicated by absolute path. Collections expand transitively with a
/// visited set terminating cycles. Individual file read errors are
/// aggregated into one failure.
pub async fn get_content(state: &Arc<ServerState>, expression: &str) -> ToolResult {
    let names: Vec<&str> = expression
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .collect();
    if names.is_empty() {
        return ToolResult::failure("No content names given", ErrorKind::ValidationError);
    }

    let session = match get_or_create_session(state, None).await {
        Ok(session) => session,
        Err(e) => return ToolResult::failure(e.to_string(), ErrorKind::Context),
    };
    let project = match session.project().await {
        Ok(project) => project,
        Err(e) => return ToolResult::failure(e.to_string(), ErrorKind::ConfigReadError),
    };
    let docroot = session.docroot();

    // Resolve each name to categories; a name may be a category, a
    // collection, or both.
    let mut category_names: Vec<String> = Vec::new();
    for name in &names {
        let mut matched = false;
        if project.categories.contains_key(*name) {
            category_names.push(name.to_string());
            matched = true;
        }
        if project.collections.contains_key(*name) {
            let mut visited = HashSet::new();
            category_names.extend(expand_collection(&project, name, &mut visited));
            matched = true;
        }
        if !matched {
            return ToolResult::failure(
                format!("No category or collection named '{}'", name),
                ErrorKind::NotFound,
            )
            .with_instruction(INSTRUCTION_NOT_FOUND);
        }
    }

    // Discover files, de-duplicating by absolute path
    let mut files: IndexMap<PathBuf, (gp_render::FileInfo, String)> = IndexMap::new();
    for category_name in &category_names {
        let Some(category) = project.categories.get(category_name) else {
            continue;
        };
        let dir = docroot.join(&category.dir);
        match discover_category_files(&dir, &category.patterns) {
            Ok(discovered) => {
                for file in discovered {
                    files
                        .entry(file.path.clone())
                        .or_insert((file, category_name.clone()));
                }
            }
            Err(e) => {
                debug!(category = %category_name, error = %e, "category discovery failed");
            }
        }
    }

    let mut sections = Vec::new();
    let mut read_errors = Vec::new();
    for (path, (file, category_name)) in &files {
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) => {
                read_errors.push(json!({
                    "file": file.name,
                    "error": e.to_string(),
                }));
                continue;
            }
        };
        let (_, body) = parse_frontmatter(&raw);

        let content = if is_template_path(path) {
            let chain = state
                .context_cache
                .template_contexts(&session, &state.manager, Some(category_name.as_str()), None)
                .await;
            let chain = TemplateContextCache::transient_context().new_child(&chain);
            match render_template(&body, &chain, &[]) {
                Ok(rendered) => rendered,
                Err(e) => {
                    read_errors.push(json!({
                        "file": file.name,
                        "error": e.to_string(),
                    }));
                    continue;
                }
            }
        } else {
            body
        };

        sections.push(format!("# {}\n\n{}", file.name, content.trim_end()));
    }

    if !read_errors.is_empty() {
        return ToolResult::failure(
            format!("{} file(s) could not be read", read_errors.len()),
            ErrorKind::FileReadError,
        )
        .with_error_data(json!({ "files": read_errors }));
    }

    ToolResult::ok(sections.join("\n\n")).with_message(format!(
        "{} file(s) from {} categor{}",
        files.len(),
        category_names.len(),
        if category_names.len() == 1 { "y" } else { "ies" }
    ))
}

/// Expand a collection into category names, following nested collections
/// and terminating cycles with the visited set.
fn expand_collection(project: &Project, name: &str, visited: &mut HashSet<String>) -> Vec<String> {
    if !visited.insert(name.to_string()) {
        return Vec::new();
    }
    let Some(collection) = project.collections.get(name) else {
        return Vec::new();
    };

    let mut categories = Vec::new();
    for reference in &collection.categories {
        if project.categories.contains_key(reference) {
            categories.push(reference.clone());
        } else if project.collections.contains_key(reference) {
            categories.extend(expand_collection(project, reference, visited));
        }
    }
    categories
}

#[cfg(test)]
#[path = "content_tests.rs"]
mod tests;
