// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! OpenSpec change records.

use crate::time_fmt::humanize_age;
use chrono::DateTime;
use serde::{Deserialize, Serialize};

/// One change entry as reported by the OpenSpec CLI's JSON output.
///
/// The `is_*` flags are annotations derived from `status` when the entry is
/// cached; they are not present in the CLI output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEntry {
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub completed_tasks: u32,
    #[serde(default)]
    pub total_tasks: u32,
    #[serde(default)]
    pub last_modified: String,
    #[serde(default)]
    pub is_draft: bool,
    #[serde(default)]
    pub is_in_progress: bool,
    #[serde(default)]
    pub is_done: bool,
}

impl ChangeEntry {
    /// Derive the boolean status flags from `status`.
    pub fn annotate(&mut self) {
        self.is_in_progress = self.status == "in-progress";
        self.is_draft = self.status == "no-tasks";
        self.is_done = self.status == "complete";
    }

    /// Progress string, `"3/5"` or `"N/A"` when the change has no tasks.
    pub fn progress(&self) -> String {
        if self.total_tasks > 0 {
            format!("{}/{}", self.completed_tasks, self.total_tasks)
        } else {
            "N/A".to_string()
        }
    }

    /// Age of the last modification relative to `now_epoch`, humanised.
    ///
    /// Falls back to the date portion of the raw value when it cannot be
    /// parsed as an RFC 3339 timestamp.
    pub fn humanized_date(&self, now_epoch: f64) -> String {
        match DateTime::parse_from_rfc3339(&self.last_modified) {
            Ok(modified) => humanize_age(now_epoch - modified.timestamp() as f64),
            Err(_) => self.last_modified.chars().take(10).collect(),
        }
    }
}

/// Changes grouped by status for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupedChanges {
    pub in_progress: Vec<GroupedChange>,
    pub draft: Vec<GroupedChange>,
    pub complete: Vec<GroupedChange>,
}

/// One change with display fields resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedChange {
    #[serde(flatten)]
    pub entry: ChangeEntry,
    pub progress: String,
    pub humanized_date: String,
}

/// Group changes into in-progress / draft / complete buckets with
/// pre-formatted progress and age strings.
pub fn group_changes(entries: &[ChangeEntry], now_epoch: f64) -> GroupedChanges {
    let mut grouped = GroupedChanges::default();
    for entry in entries {
        let formatted = GroupedChange {
            progress: entry.progress(),
            humanized_date: entry.humanized_date(now_epoch),
            entry: entry.clone(),
        };
        match entry.status.as_str() {
            "in-progress" => grouped.in_progress.push(formatted),
            "no-tasks" => grouped.draft.push(formatted),
            "complete" => grouped.complete.push(formatted),
            _ => {}
        }
    }
    grouped
}

#[cfg(test)]
#[path = "openspec_tests.rs"]
mod tests;
