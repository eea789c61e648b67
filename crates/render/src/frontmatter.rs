// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! YAML frontmatter extraction.

use serde_json::{Map, Value};

/// Parsed frontmatter block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frontmatter(pub Map<String, Value>);

impl Frontmatter {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn string(&self, key: &str) -> Option<String> {
        self.0.get(key).and_then(|v| v.as_str()).map(String::from)
    }

    /// A key holding either a string or a list of strings.
    pub fn string_list(&self, key: &str) -> Vec<String> {
        match self.0.get(key) {
            Some(Value::String(s)) => vec![s.clone()],
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Flags named by a `requires-flag` entry that must be enabled for the
    /// template to apply.
    pub fn required_flags(&self) -> Vec<String> {
        self.string_list("requires-flag")
    }

    pub fn instruction(&self) -> Option<String> {
        self.string("instruction")
    }

    pub fn required_args(&self) -> Vec<String> {
        self.string_list("required_args")
    }

    pub fn required_kwargs(&self) -> Vec<String> {
        self.string_list("required_kwargs")
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

/// Split content into an optional frontmatter block and the body.
///
/// Frontmatter is a leading `---` fenced YAML block. Content without a
/// valid fence, or with YAML that fails to parse, is returned unchanged
/// with no frontmatter.
pub fn parse_frontmatter(content: &str) -> (Option<Frontmatter>, String) {
    let Some(rest) = content.strip_prefix("---\n").or_else(|| {
        content
            .strip_prefix("---\r\n")
    }) else {
        return (None, content.to_string());
    };

    let Some(end) = rest.find("\n---").map(|i| i + 1) else {
        return (None, content.to_string());
    };
    let yaml = &rest[..end - 1];
    let mut body = &rest[end + 3..];
    body = body.strip_prefix('\r').unwrap_or(body);
    body = body.strip_prefix('\n').unwrap_or(body);

    match serde_yaml::from_str::<Value>(yaml) {
        Ok(Value::Object(map)) => (Some(Frontmatter(map)), body.to_string()),
        _ => (None, content.to_string()),
    }
}

#[cfg(test)]
#[path = "frontmatter_tests.rs"]
mod tests;
