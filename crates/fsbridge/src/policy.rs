// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read/write security policy for agent-reported paths.

use crate::system_dirs::is_system_directory;
use crate::temp_dirs::is_safe_temp_path;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tracing::{debug, warn};

/// Raised when a path violates the security policy.
#[derive(Debug, Error)]
pub enum SecurityError {
    #[error("System directory access denied: {0}")]
    SystemDirectory(String),
    #[error("Absolute path not in additional_read_paths: {0}")]
    AbsoluteReadDenied(String),
    #[error("Path traversal detected in {0}")]
    PathTraversal(String),
    #[error("Write to absolute path not allowed: {0}")]
    AbsoluteWriteDenied(String),
    #[error("Path {0} is outside allowed write directories")]
    WriteDenied(String),
}

/// Security policy with disjoint read and write permission sets.
///
/// Write-allowed paths are relative directories stored with a trailing `/`;
/// read paths are absolute. The violation counter is monotonic for the
/// lifetime of the policy.
pub struct ReadWriteSecurityPolicy {
    write_allowed_paths: Vec<String>,
    additional_read_paths: Vec<String>,
    project_root: Option<PathBuf>,
    violations: AtomicU64,
}

impl ReadWriteSecurityPolicy {
    pub fn new(write_allowed_paths: &[String], additional_read_paths: &[String]) -> Self {
        Self {
            write_allowed_paths: write_allowed_paths
                .iter()
                .map(|p| format!("{}/", p.trim_end_matches('/')))
                .collect(),
            additional_read_paths: additional_read_paths.to_vec(),
            project_root: None,
            violations: AtomicU64::new(0),
        }
    }

    /// Inject the project root once discovered from the agent.
    pub fn set_project_root(&mut self, project_root: impl Into<PathBuf>) {
        self.project_root = Some(project_root.into());
    }

    /// Validate a path for read operations, returning the normalized form.
    pub fn validate_read_path(&self, path: &str) -> Result<String, SecurityError> {
        let path_obj = Path::new(path);

        if is_absolute(path) {
            // The blacklist dominates everything, including paths listed
            // verbatim in additional_read_paths.
            if is_system_directory(path) {
                return Err(self.violation(SecurityError::SystemDirectory(path.to_string())));
            }

            let normalized = path.replace('\\', "/");
            for allowed in &self.additional_read_paths {
                let prefix = allowed.trim_end_matches('/');
                if normalized == prefix || normalized.starts_with(&format!("{}/", prefix)) {
                    return Ok(path.to_string());
                }
            }

            if let Some(root) = &self.project_root {
                if let Ok(relative) = path_obj.strip_prefix(root) {
                    return self.validate_relative_read(&relative.to_string_lossy());
                }
            }

            return Err(self.violation(SecurityError::AbsoluteReadDenied(path.to_string())));
        }

        self.validate_relative_read(path)
    }

    fn validate_relative_read(&self, path: &str) -> Result<String, SecurityError> {
        if has_parent_component(Path::new(path)) {
            return Err(self.violation(SecurityError::PathTraversal(path.to_string())));
        }
        Ok(path.replace('\\', "/"))
    }

    /// Validate a path for write operations, returning the normalized form.
    pub fn validate_write_path(&self, path: &str) -> Result<String, SecurityError> {
        let path_obj = Path::new(path);

        if is_absolute(path) {
            if is_safe_temp_path(path_obj) {
                debug!(path, "write allowed to temporary directory");
                return Ok(path.to_string());
            }
            return Err(self.violation(SecurityError::AbsoluteWriteDenied(path.to_string())));
        }

        let normalized = path.replace('\\', "/");
        if has_parent_component(Path::new(&normalized)) {
            return Err(self.violation(SecurityError::PathTraversal(path.to_string())));
        }

        if is_safe_temp_path(Path::new(&normalized)) {
            debug!(path, "write allowed to temporary directory");
            return Ok(normalized);
        }

        for allowed in &self.write_allowed_paths {
            if normalized.starts_with(allowed.as_str()) {
                debug!(path, target = %normalized, "write allowed");
                return Ok(normalized);
            }
        }

        Err(self.violation(SecurityError::WriteDenied(path.to_string())))
    }

    /// Number of violations detected by this policy.
    pub fn violation_count(&self) -> u64 {
        self.violations.load(Ordering::Relaxed)
    }

    fn violation(&self, error: SecurityError) -> SecurityError {
        let count = self.violations.fetch_add(1, Ordering::Relaxed) + 1;
        warn!(violation = count, %error, "security violation");
        error
    }
}

/// Absolute on either Unix or Windows (drive letter) conventions.
///
/// Agent paths come from the agent's host, which may not match the server's
/// platform, so `Path::is_absolute` alone is not enough.
fn is_absolute(path: &str) -> bool {
    if Path::new(path).is_absolute() || path.starts_with('/') {
        return true;
    }
    let bytes = path.as_bytes();
    bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes[2] == b'\\' || bytes[2] == b'/')
}

fn has_parent_component(path: &Path) -> bool {
    path.components()
        .any(|c| matches!(c, Component::ParentDir))
}

#[cfg(test)]
#[path = "policy_tests.rs"]
mod tests;
