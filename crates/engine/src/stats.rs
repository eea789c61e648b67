// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-task statistics for template rendering.

use gp_core::format_duration;
use serde::Serialize;

/// Kind of a tracked task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Regular,
    Timer,
}

/// Internal per-task record.
#[derive(Debug, Clone)]
pub(crate) struct TaskStats {
    pub name: String,
    pub kind: TaskKind,
    pub started: f64,
    pub last_data: Option<f64>,
    pub interval: Option<f64>,
    pub last_run: Option<f64>,
    pub next_run: Option<f64>,
    pub run_count: u64,
}

impl TaskStats {
    pub fn regular(name: String, now: f64) -> Self {
        Self {
            name,
            kind: TaskKind::Regular,
            started: now,
            last_data: None,
            interval: None,
            last_run: None,
            next_run: None,
            run_count: 0,
        }
    }

    pub fn timer(name: String, now: f64, interval: f64) -> Self {
        Self {
            name,
            kind: TaskKind::Timer,
            started: now,
            // Timer tasks start with last_data set; regular tasks do not.
            last_data: Some(now),
            interval: Some(interval),
            last_run: None,
            next_run: Some(now + interval),
            run_count: 0,
        }
    }

    /// Strip timer fields after a TIMER_ONCE downgrade.
    pub fn downgrade(&mut self) {
        self.kind = TaskKind::Regular;
        self.interval = None;
        self.last_run = None;
        self.next_run = None;
        self.run_count = 0;
    }
}

/// Snapshot of one task's statistics.
#[derive(Debug, Clone, Serialize)]
pub struct TaskStatsView {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TaskKind,
    pub started: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_data: Option<f64>,
    pub runtime: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_run: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_run: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_since_last: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_until_next: Option<String>,
}

impl TaskStatsView {
    pub(crate) fn from_stats(stats: &TaskStats, now: f64) -> Self {
        let is_timer = stats.kind == TaskKind::Timer;
        Self {
            name: stats.name.clone(),
            kind: stats.kind,
            started: stats.started,
            last_data: stats.last_data,
            runtime: format_duration(now - stats.started),
            interval: stats.interval,
            last_run: stats.last_run,
            next_run: stats.next_run,
            run_count: is_timer.then_some(stats.run_count),
            time_since_last: stats.last_run.map(|t| format_duration(now - t)),
            time_until_next: stats.next_run.map(|t| format_duration(t - now)),
        }
    }
}

/// Snapshot of all task statistics, shaped for template context.
#[derive(Debug, Clone, Serialize)]
pub struct TaskStatistics {
    pub running: Vec<TaskStatsView>,
    pub timers: Vec<TaskStatsView>,
    /// Unique tasks (not subscriptions)
    pub count: usize,
    pub peak_count: usize,
    pub total_timer_runs: u64,
}
