// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Handlebars rendering with line-context errors.

use crate::context::ContextChain;
use handlebars::{
    Context, Handlebars, Helper, HelperDef, HelperResult, Output, RenderContext, Renderable,
};
use semver::Version;
use thiserror::Error;
use tracing::debug;

/// Template rendering failure with source line context when available.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct RenderError {
    pub message: String,
    /// Offending source line, when the engine reported a position
    pub line: Option<String>,
}

/// Block helper gating content on the OpenSpec CLI version:
/// `{{#has_version "1.2.0"}}...{{else}}...{{/has_version}}`.
///
/// Reads `openspec.version` from the render data; an unknown or unparsable
/// version fails the check.
#[derive(Clone, Copy)]
struct HasVersionHelper;

impl HelperDef for HasVersionHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        r: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let minimum = h
            .param(0)
            .and_then(|p| p.value().as_str())
            .unwrap_or_default();
        let version = ctx
            .data()
            .pointer("/openspec/version")
            .and_then(|v| v.as_str())
            .unwrap_or_default();

        let branch = if version_at_least(version, minimum) {
            h.template()
        } else {
            h.inverse()
        };
        if let Some(template) = branch {
            template.render(r, ctx, rc, out)?;
        }
        Ok(())
    }
}

/// Compare versions after stripping any leading `v`.
pub fn version_at_least(current: &str, minimum: &str) -> bool {
    let parse = |raw: &str| Version::parse(raw.trim().trim_start_matches('v'));
    match (parse(current), parse(minimum)) {
        (Ok(current), Ok(minimum)) => current >= minimum,
        _ => false,
    }
}

/// Render template content against a context chain.
pub fn render_template(
    content: &str,
    context: &ContextChain,
    partials: &[(String, String)],
) -> Result<String, RenderError> {
    let mut registry = Handlebars::new();
    registry.set_strict_mode(false);
    registry.register_escape_fn(handlebars::no_escape);
    registry.register_helper("has_version", Box::new(HasVersionHelper));

    for (name, partial) in partials {
        if let Err(e) = registry.register_partial(name, partial) {
            return Err(RenderError {
                message: format!("invalid partial '{}': {}", name, e),
                line: None,
            });
        }
    }

    let data = context.flatten();
    registry.render_template(content, &data).map_err(|e| {
        let line = e
            .line_no
            .and_then(|n| content.lines().nth(n.saturating_sub(1)))
            .map(|l| l.trim_end().to_string());
        debug!(error = %e, "template render failed");
        RenderError {
            message: match e.line_no {
                Some(n) => format!("line {}: {}", n, e.reason()),
                None => e.reason().to_string(),
            },
            line,
        }
    })
}

#[cfg(test)]
#[path = "renderer_tests.rs"]
mod tests;
