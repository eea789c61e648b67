// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared state published by tasks for other tasks and the pipeline.
//!
//! Each producer/consumer pair is a typed field so the link is visible to
//! the compiler; `extra` remains as an escape hatch for experimental keys.

use gp_core::{ChangeEntry, WorkflowState};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Default)]
pub struct Blackboard {
    /// Last parsed workflow state (WorkflowMonitorTask)
    pub workflow_state: Option<WorkflowState>,
    /// Rendered change content that replaces the next tool response value
    pub workflow_change_content: Option<String>,
    /// Cached OpenSpec changes with the wall-clock time they were cached
    pub openspec_changes: Option<Vec<ChangeEntry>>,
    pub openspec_changes_at: Option<f64>,
    /// Directory names under openspec/changes, as last listed by the agent
    pub openspec_changes_list: Option<Vec<String>>,
    pub openspec_changes_list_at: Option<f64>,
    /// Whether the current workflow issue names an OpenSpec change
    pub openspec_current_change: Option<bool>,
    /// OpenSpec CLI facts (OpenSpecTask)
    pub openspec_version: Option<String>,
    pub openspec_available: Option<bool>,
    pub openspec_project_enabled: Option<bool>,
    /// Client facts (ClientInfoTask)
    pub client_os_info: Option<Value>,
    pub client_context_info: Option<Value>,
    extra: HashMap<String, Value>,
}

impl Blackboard {
    /// Opaque storage for keys without a typed field yet.
    pub fn extra(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    pub fn set_extra(&mut self, key: impl Into<String>, value: Value) {
        self.extra.insert(key.into(), value);
    }

    pub fn clear_extra(&mut self, key: &str) -> Option<Value> {
        self.extra.remove(key)
    }
}
