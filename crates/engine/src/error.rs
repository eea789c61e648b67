// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the task engine.

use thiserror::Error;

/// Errors that can occur in the task manager.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("timer interval must be positive")]
    InvalidInterval,
}
