// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow state records.
//!
//! A workflow state is parsed from a project-owned markdown file naming the
//! current phase, tracked issue, and queued work. Change events are the
//! semantic diff between two parsed states.

use serde::{Deserialize, Serialize};

/// Parsed workflow state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WorkflowState {
    #[serde(default)]
    pub phase: Option<String>,
    #[serde(default)]
    pub issue: Option<String>,
    #[serde(default)]
    pub tracking: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub queue: Vec<String>,
}

/// Semantic difference between two workflow states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    PhaseChanged {
        from: Option<String>,
        to: Option<String>,
    },
    IssueChanged {
        from: Option<String>,
        to: Option<String>,
    },
    TrackingChanged {
        from: Option<String>,
        to: Option<String>,
    },
    DescriptionChanged,
    QueueChanged {
        added: Vec<String>,
        removed: Vec<String>,
    },
}

impl ChangeEvent {
    /// Template name used to render the instruction for this change.
    pub fn template_name(&self) -> &'static str {
        match self {
            ChangeEvent::PhaseChanged { .. } => "phase-change",
            ChangeEvent::IssueChanged { .. } => "issue-change",
            ChangeEvent::TrackingChanged { .. } => "tracking-change",
            ChangeEvent::DescriptionChanged => "description-change",
            ChangeEvent::QueueChanged { .. } => "queue-change",
        }
    }
}
