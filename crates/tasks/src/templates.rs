// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Docroot template rendering for task instructions.

use gp_config::{resolve_all_flags, ConfigError, Session};
use gp_engine::TaskManager;
use gp_render::{
    parse_frontmatter, render_template, resolve_file_with_extensions, ContextChain, RenderError,
    TemplateContextCache,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template not found: {0}")]
    NotFound(String),
    #[error("failed to read template {name}: {source}")]
    Io {
        name: String,
        source: std::io::Error,
    },
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Rendered template plus its frontmatter instruction, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedContent {
    pub content: String,
    pub instruction: Option<String>,
}

/// Render `docroot/<subdir>/<name>` against the layered context chain.
///
/// Returns `Ok(None)` when the template's `requires-flag` frontmatter names
/// a flag that is not enabled; the template filters itself out.
pub async fn render_task_template(
    session: &Session,
    manager: &TaskManager,
    cache: &TemplateContextCache,
    subdir: &str,
    name: &str,
    extra: Option<ContextChain>,
) -> Result<Option<RenderedContent>, TemplateError> {
    let base_path = session.docroot().join(subdir).join(name);
    let Some(path) = resolve_file_with_extensions(&base_path) else {
        return Err(TemplateError::NotFound(format!("{}/{}", subdir, name)));
    };

    let raw = tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| TemplateError::Io {
            name: format!("{}/{}", subdir, name),
            source,
        })?;
    let (frontmatter, body) = parse_frontmatter(&raw);

    if let Some(frontmatter) = &frontmatter {
        let required = frontmatter.required_flags();
        if !required.is_empty() {
            let flags = resolve_all_flags(session).await?;
            let satisfied = required
                .iter()
                .all(|flag| flags.get(flag).map(|v| v.is_enabled()).unwrap_or(false));
            if !satisfied {
                return Ok(None);
            }
        }
    }

    let base = cache.template_contexts(session, manager, None, None).await;
    let mut chain = match extra {
        Some(extra) => extra.new_child(&base),
        None => base,
    };
    chain = TemplateContextCache::transient_context().new_child(&chain);

    let content = render_template(&body, &chain, &[])?;
    let instruction = match frontmatter.as_ref().and_then(|f| f.instruction()) {
        Some(template) => Some(render_template(&template, &chain, &[])?),
        None => None,
    };

    Ok(Some(RenderedContent {
        content,
        instruction,
    }))
}
