// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Semantic change detection between workflow states.

use gp_core::{ChangeEvent, WorkflowState};

/// Diff two workflow states into semantic change events.
///
/// The first observation (no previous state) yields no events; the state is
/// simply cached.
pub fn detect_workflow_changes(
    old: Option<&WorkflowState>,
    new: &WorkflowState,
) -> Vec<ChangeEvent> {
    let Some(old) = old else {
        return Vec::new();
    };

    let mut events = Vec::new();

    if old.phase != new.phase {
        events.push(ChangeEvent::PhaseChanged {
            from: old.phase.clone(),
            to: new.phase.clone(),
        });
    }
    if old.issue != new.issue {
        events.push(ChangeEvent::IssueChanged {
            from: old.issue.clone(),
            to: new.issue.clone(),
        });
    }
    if old.tracking != new.tracking {
        events.push(ChangeEvent::TrackingChanged {
            from: old.tracking.clone(),
            to: new.tracking.clone(),
        });
    }
    if old.description != new.description {
        events.push(ChangeEvent::DescriptionChanged);
    }
    if old.queue != new.queue {
        let added = new
            .queue
            .iter()
            .filter(|item| !old.queue.contains(item))
            .cloned()
            .collect();
        let removed = old
            .queue
            .iter()
            .filter(|item| !new.queue.contains(item))
            .cloned()
            .collect();
        events.push(ChangeEvent::QueueChanged { added, removed });
    }

    events
}

#[cfg(test)]
#[path = "changes_tests.rs"]
mod tests;
