// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for configuration handling.

use thiserror::Error;

/// Errors that can occur loading, validating, or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid name: {0}")]
    InvalidName(String),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("no config directory available")]
    NoConfigDir,
    #[error("failed to read configuration: {0}")]
    Read(#[source] std::io::Error),
    #[error("failed to write configuration: {0}")]
    Write(#[source] std::io::Error),
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialise configuration: {0}")]
    Serialise(#[from] toml::ser::Error),
    #[error("no session available: {0}")]
    NoSession(String),
}
