// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Name and field validation rules.

use crate::error::ConfigError;
use regex::Regex;
use std::path::{Component, Path};
use std::sync::OnceLock;

const MAX_NAME_LEN: usize = 30;
const MAX_DESCRIPTION_LEN: usize = 500;

fn name_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        #[allow(clippy::expect_used)]
        Regex::new("^[A-Za-z0-9_-]+$").expect("static regex")
    })
}

/// Project names: non-empty, alphanumeric plus `_` and `-`.
pub fn validate_project_name(name: &str) -> Result<(), ConfigError> {
    if name.trim().is_empty() {
        return Err(ConfigError::InvalidName(
            "Project name cannot be empty".to_string(),
        ));
    }
    if !name_regex().is_match(name) {
        return Err(ConfigError::InvalidName(format!(
            "Project name '{}' must contain only alphanumeric characters, underscores, and hyphens",
            name
        )));
    }
    Ok(())
}

/// Category names additionally reserve a leading underscore.
pub fn validate_category_name(name: &str) -> Result<(), ConfigError> {
    validate_scoped_name("Category", name)?;
    if name.starts_with('_') {
        return Err(ConfigError::InvalidName(format!(
            "Category name '{}' cannot start with an underscore (reserved)",
            name
        )));
    }
    Ok(())
}

pub fn validate_collection_name(name: &str) -> Result<(), ConfigError> {
    validate_scoped_name("Collection", name)
}

fn validate_scoped_name(kind: &str, name: &str) -> Result<(), ConfigError> {
    if name.is_empty() {
        return Err(ConfigError::InvalidName(format!(
            "{} name cannot be empty",
            kind
        )));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(ConfigError::InvalidName(format!(
            "{} name '{}' exceeds {} characters",
            kind, name, MAX_NAME_LEN
        )));
    }
    if !name_regex().is_match(name) {
        return Err(ConfigError::InvalidName(format!(
            "{} name '{}' must contain only alphanumeric characters, underscores, and hyphens",
            kind, name
        )));
    }
    Ok(())
}

/// Descriptions: bounded, without embedded quotes.
pub fn validate_description(description: &str) -> Result<(), ConfigError> {
    if description.len() > MAX_DESCRIPTION_LEN {
        return Err(ConfigError::Validation(format!(
            "Description exceeds {} characters",
            MAX_DESCRIPTION_LEN
        )));
    }
    if description.contains('"') || description.contains('\'') {
        return Err(ConfigError::Validation(
            "Description cannot contain quotes".to_string(),
        ));
    }
    Ok(())
}

/// Patterns: relative, without parent-directory segments.
pub fn validate_patterns(patterns: &[String]) -> Result<(), ConfigError> {
    for pattern in patterns {
        let path = Path::new(pattern);
        if path.is_absolute() || pattern.starts_with('/') {
            return Err(ConfigError::Validation(format!(
                "Pattern '{}' must not be absolute",
                pattern
            )));
        }
        if path.components().any(|c| matches!(c, Component::ParentDir)) {
            return Err(ConfigError::Validation(format!(
                "Pattern '{}' must not contain '..' segments",
                pattern
            )));
        }
    }
    Ok(())
}

/// Flag names: same character set as project names, no dots.
pub fn validate_flag_name(name: &str) -> Result<(), ConfigError> {
    if name.is_empty() || !name_regex().is_match(name) {
        return Err(ConfigError::InvalidName(format!(
            "Flag name '{}' must contain only alphanumeric characters, underscores, and hyphens",
            name
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
