// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persisted project configuration model.
//!
//! A `Project` is an immutable value: every mutation builds a new one, which
//! is persisted atomically before the session's cached copy is replaced.
//! Category and collection maps preserve insertion order.

use crate::error::ConfigError;
use crate::validate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A named directory plus glob patterns selecting files within it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Category {
    pub dir: String,
    #[serde(default)]
    pub patterns: Vec<String>,
    #[serde(default)]
    pub description: String,
}

/// A named set of categories; may reference other collections.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Collection {
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub description: String,
}

/// Feature-flag value: bool, string, string list, or string map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    Bool(bool),
    Str(String),
    List(Vec<String>),
    Map(IndexMap<String, String>),
}

impl FlagValue {
    /// Whether this value enables the feature it names.
    pub fn is_enabled(&self) -> bool {
        match self {
            FlagValue::Bool(b) => *b,
            FlagValue::Str(s) => !s.is_empty() && s != "false",
            FlagValue::List(l) => !l.is_empty(),
            FlagValue::Map(m) => !m.is_empty(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FlagValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FlagValue::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, String>> {
        match self {
            FlagValue::Map(m) => Some(m),
            _ => None,
        }
    }
}

/// The persisted unit of configuration.
///
/// Scalar fields precede the maps: the TOML serialiser requires plain
/// values before nested tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub key: String,
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub allowed_write_paths: Vec<String>,
    #[serde(default)]
    pub additional_read_paths: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openspec_version: Option<String>,
    #[serde(default)]
    pub openspec_validated: bool,
    #[serde(default)]
    pub categories: IndexMap<String, Category>,
    #[serde(default)]
    pub collections: IndexMap<String, Collection>,
    #[serde(default)]
    pub project_flags: IndexMap<String, FlagValue>,
}

impl Project {
    /// Create an empty project. The key is the display name; the hash is a
    /// short content fingerprint.
    pub fn new(name: impl Into<String>) -> Result<Self, ConfigError> {
        let name = name.into();
        validate::validate_project_name(&name)?;

        let mut hasher = Sha256::new();
        hasher.update(name.as_bytes());
        let hash = format!("{:x}", hasher.finalize())[..8].to_string();

        Ok(Self {
            key: name.clone(),
            name,
            hash,
            allowed_write_paths: Vec::new(),
            additional_read_paths: Vec::new(),
            openspec_version: None,
            openspec_validated: false,
            categories: IndexMap::new(),
            collections: IndexMap::new(),
            project_flags: IndexMap::new(),
        })
    }

    /// Validate cross-references and field constraints.
    ///
    /// Enforced on update, not on load; legacy configs may be tolerant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate::validate_project_name(&self.name)?;

        for (name, category) in &self.categories {
            validate::validate_category_name(name)?;
            validate::validate_description(&category.description)?;
            validate::validate_patterns(&category.patterns)?;
        }

        for (name, collection) in &self.collections {
            validate::validate_collection_name(name)?;
            validate::validate_description(&collection.description)?;
            for referenced in &collection.categories {
                if !self.categories.contains_key(referenced)
                    && !self.collections.contains_key(referenced)
                {
                    return Err(ConfigError::Validation(format!(
                        "collection '{}' references unknown category '{}'",
                        name, referenced
                    )));
                }
            }
        }

        for name in self.project_flags.keys() {
            validate::validate_flag_name(name)?;
        }

        Ok(())
    }
}

/// Mutable per-session state, distinct from the persisted project.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// Working directory last reported by the agent
    pub current_dir: Option<String>,
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
