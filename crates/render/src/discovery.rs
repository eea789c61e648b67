// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File discovery for category directories and template resolution.

use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;

/// Extensions marking a file as a template. Patterns never include these;
/// template variants are discovered automatically and hidden from display
/// names.
pub const TEMPLATE_EXTENSIONS: &[&str] = &[".hbs", ".handlebars", ".mustache"];

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("category directory must be absolute: {0}")]
    NotAbsolute(PathBuf),
    #[error("category directory not found: {0}")]
    NotFound(PathBuf),
    #[error("pattern '{pattern}' must not include a template extension")]
    TemplateExtensionInPattern { pattern: String },
    #[error("invalid pattern '{pattern}': {source}")]
    BadPattern {
        pattern: String,
        source: glob::PatternError,
    },
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Discovered file metadata.
#[derive(Debug, Clone)]
pub struct FileInfo {
    /// Absolute path on disk
    pub path: PathBuf,
    /// Path relative to the category directory
    pub rel: PathBuf,
    /// Display name: relative path without any template extension
    pub name: String,
    pub size: u64,
    pub mtime: SystemTime,
}

/// True when the path carries a template extension.
pub fn is_template_path(path: &Path) -> bool {
    let name = path.to_string_lossy();
    TEMPLATE_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}

/// Relative path with any template extension stripped, in posix form.
pub fn display_name(rel: &Path) -> String {
    let mut name = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    for ext in TEMPLATE_EXTENSIONS {
        if let Some(stripped) = name.strip_suffix(ext) {
            name = stripped.to_string();
            break;
        }
    }
    name
}

/// Expand a base pattern into the variants that may exist on disk:
/// the pattern itself, `.*` for any extension, and template-suffixed forms
/// of both.
pub fn expand_patterns(base: &str) -> Vec<String> {
    let mut patterns = vec![base.to_string(), format!("{}.*", base)];
    for ext in TEMPLATE_EXTENSIONS {
        patterns.push(format!("{}{}", base, ext));
        patterns.push(format!("{}.*{}", base, ext));
    }
    patterns
}

/// Resolve a file path trying extension variants in order: exact, `.md`,
/// each template extension, then `.md` plus each template extension.
pub fn resolve_file_with_extensions(base: &Path) -> Option<PathBuf> {
    if base.is_file() {
        return Some(base.to_path_buf());
    }

    let raw = base.to_string_lossy();
    let md = PathBuf::from(format!("{}.md", raw));
    if md.is_file() {
        return Some(md);
    }

    for ext in TEMPLATE_EXTENSIONS {
        let candidate = PathBuf::from(format!("{}{}", raw, ext));
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    for ext in TEMPLATE_EXTENSIONS {
        let candidate = PathBuf::from(format!("{}.md{}", raw, ext));
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}

/// Discover files under a category directory matching the given patterns.
///
/// Patterns are expanded with extension and template variants. When both a
/// plain file and its template variant exist, the plain file wins. Results
/// are sorted by relative path.
pub fn discover_category_files(
    category_dir: &Path,
    patterns: &[String],
) -> Result<Vec<FileInfo>, DiscoveryError> {
    if !category_dir.is_absolute() {
        return Err(DiscoveryError::NotAbsolute(category_dir.to_path_buf()));
    }
    if !category_dir.is_dir() {
        return Err(DiscoveryError::NotFound(category_dir.to_path_buf()));
    }

    for pattern in patterns {
        if TEMPLATE_EXTENSIONS.iter().any(|ext| pattern.ends_with(ext)) {
            return Err(DiscoveryError::TemplateExtensionInPattern {
                pattern: pattern.clone(),
            });
        }
    }

    let mut matched: Vec<PathBuf> = Vec::new();
    for base in patterns {
        for pattern in expand_patterns(base) {
            let full = category_dir.join(&pattern);
            let entries =
                glob::glob(&full.to_string_lossy()).map_err(|source| DiscoveryError::BadPattern {
                    pattern: pattern.clone(),
                    source,
                })?;
            for entry in entries.flatten() {
                if entry.is_file() {
                    matched.push(entry);
                }
            }
        }
    }
    matched.sort();
    matched.dedup();

    // Group by display key; sorted order puts the non-template variant
    // first, so the first occurrence wins.
    let mut by_key: indexmap::IndexMap<String, PathBuf> = indexmap::IndexMap::new();
    for path in matched {
        let rel = path
            .strip_prefix(category_dir)
            .unwrap_or(&path)
            .to_path_buf();
        let key = display_name(&rel);
        by_key.entry(key).or_insert(path);
    }

    let mut results = Vec::new();
    for path in by_key.values() {
        let metadata = std::fs::metadata(path).map_err(|source| DiscoveryError::Io {
            path: path.clone(),
            source,
        })?;
        let rel = path
            .strip_prefix(category_dir)
            .unwrap_or(path)
            .to_path_buf();
        results.push(FileInfo {
            name: display_name(&rel),
            rel,
            path: path.clone(),
            size: metadata.len(),
            mtime: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
        });
    }
    results.sort_by(|a, b| a.rel.cmp(&b.rel));
    Ok(results)
}

#[cfg(test)]
#[path = "discovery_tests.rs"]
mod tests;
