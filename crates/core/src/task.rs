// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task subscriber trait.
//!
//! A task registers with the task manager and receives events whose mask
//! intersects its subscription. Handlers run sequentially; an error from one
//! handler is logged by the dispatcher and never stops the others.

use crate::event::{EventData, EventType};
use crate::result::ToolResult;
use async_trait::async_trait;
use thiserror::Error;

/// Error raised by a task handler. Swallowed (logged) by the dispatcher.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct TaskError(pub String);

impl From<String> for TaskError {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TaskError {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Outcome of handling an event.
#[derive(Debug)]
pub enum Handled {
    /// Event not relevant to this task
    No,
    /// Event consumed
    Yes,
    /// Event consumed, and this result should replace the response of the
    /// tool invocation whose dispatch delivered the event
    Replace(ToolResult),
}

impl Handled {
    pub fn is_handled(&self) -> bool {
        !matches!(self, Handled::No)
    }
}

/// An object that subscribes to task-manager events.
///
/// Lifetimes are process-long unless the task unsubscribes itself.
#[async_trait]
pub trait Task: Send + Sync {
    /// Readable name, also used as the unsubscribe key.
    fn name(&self) -> &str;

    /// Called once after server start.
    async fn on_init(&self) -> Result<(), TaskError> {
        Ok(())
    }

    /// Called before every tool/prompt body runs.
    async fn on_tool(&self) -> Result<(), TaskError> {
        Ok(())
    }

    /// Handle an event whose mask intersected this task's subscription.
    async fn handle_event(
        &self,
        event_type: EventType,
        data: &EventData,
    ) -> Result<Handled, TaskError>;
}
