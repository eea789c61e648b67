// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command path validation for the guide prompt.
//!
//! Command paths name template files under the docroot; anything that could
//! escape it or smuggle shell syntax is rejected before discovery runs.

const SHELL_METACHARS: &[char] = &[';', '|', '&', '$', '`', '(', ')', '<', '>'];

/// Validate a raw command path. Returns the trimmed path, or a short
/// message naming the violation.
pub fn validate_command_path(raw: &str) -> Result<String, String> {
    let path = raw.trim();

    if path.is_empty() {
        return Err("command path is empty".to_string());
    }

    if path.contains('\0') || path.contains('\r') || path.contains('\n') || path.contains('\t') {
        return Err("control characters are not allowed".to_string());
    }

    if path.starts_with('/') || path.starts_with('\\') {
        return Err("absolute paths are not allowed".to_string());
    }

    // Windows drive letters ("C:" anywhere in the first segment)
    let bytes = path.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        return Err("drive letters are not allowed".to_string());
    }

    if path.split(['/', '\\']).any(|segment| segment == "..") {
        return Err("path traversal is not allowed".to_string());
    }

    if let Some(bad) = path.chars().find(|c| SHELL_METACHARS.contains(c)) {
        return Err(format!("character '{}' is not allowed", bad));
    }

    Ok(path.to_string())
}

#[cfg(test)]
#[path = "security_tests.rs"]
mod tests;
