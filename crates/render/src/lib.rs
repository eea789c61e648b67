// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! gp-render: template context assembly and rendering.

pub mod context;
pub mod context_cache;
pub mod discovery;
pub mod frontmatter;
pub mod renderer;

pub use context::ContextChain;
pub use context_cache::TemplateContextCache;
pub use discovery::{
    discover_category_files, display_name, expand_patterns, is_template_path,
    resolve_file_with_extensions, DiscoveryError, FileInfo, TEMPLATE_EXTENSIONS,
};
pub use frontmatter::{parse_frontmatter, Frontmatter};
pub use renderer::{render_template, version_at_least, RenderError};
