// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task coordination: subscriptions, dispatch, timers, instructions.
//!
//! The manager is a process-wide value owned by the server and shared via
//! `Arc`; tests construct their own. All locks are released before any
//! handler is awaited, so handlers may re-enter the manager freely.

use crate::blackboard::Blackboard;
use crate::error::EngineError;
use crate::stats::{TaskStatistics, TaskStats, TaskStatsView};
use gp_core::{Clock, EventData, EventType, Handled, Subscription, SystemClock, Task, ToolResult};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

/// Outcome of one event dispatch.
#[derive(Debug, Default)]
pub struct DispatchOutcome {
    /// True when at least one task handled the event
    pub processed: bool,
    /// Replacement response requested by a handler
    pub override_result: Option<ToolResult>,
}

impl DispatchOutcome {
    pub fn status(&self) -> &'static str {
        if self.processed {
            "processed"
        } else {
            "acknowledged"
        }
    }

    /// Acknowledgement shape returned to callback tools.
    pub fn to_value(&self) -> Value {
        serde_json::json!({ "status": self.status() })
    }
}

#[derive(Default)]
struct Inner {
    subscriptions: Vec<Subscription>,
    next_timer_id: u64,
    pending_instructions: VecDeque<String>,
    stats: indexmap::IndexMap<String, TaskStats>,
    peak_subscription_count: usize,
    total_timer_runs: u64,
}

/// Event-driven task coordinator.
pub struct TaskManager {
    clock: Arc<dyn Clock>,
    inner: Mutex<Inner>,
    blackboard: Mutex<Blackboard>,
    timer_worker: Mutex<Option<JoinHandle<()>>>,
}

impl TaskManager {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            inner: Mutex::new(Inner {
                next_timer_id: 1,
                ..Inner::default()
            }),
            blackboard: Mutex::new(Blackboard::default()),
            timer_worker: Mutex::new(None),
        }
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    // -- subscriptions ----------------------------------------------------

    /// Subscribe a task to events, optionally on a timer.
    ///
    /// Duplicate calls yield independent subscriptions. A zero interval is
    /// rejected.
    pub fn subscribe(
        &self,
        task: Arc<dyn Task>,
        event_types: EventType,
        interval: Option<Duration>,
    ) -> Result<(), EngineError> {
        if let Some(interval) = interval {
            if interval.is_zero() {
                return Err(EngineError::InvalidInterval);
            }
        }

        let name = task.name().to_string();
        let key = task_key(&task);
        let now = self.clock.now();
        let epoch = self.clock.epoch();
        trace!(task = %name, ?event_types, ?interval, "subscribe");

        let mut inner = self.inner.lock();
        match interval {
            Some(interval) => {
                let bit = EventType::unique_timer_bit(inner.next_timer_id);
                inner.next_timer_id += 1;
                inner
                    .subscriptions
                    .push(Subscription::timer(task, event_types, interval, bit, now));
                inner
                    .stats
                    .insert(key, TaskStats::timer(name, epoch, interval.as_secs_f64()));
            }
            None => {
                inner
                    .subscriptions
                    .push(Subscription::regular(task, event_types));
                inner.stats.insert(key, TaskStats::regular(name, epoch));
            }
        }
        inner.peak_subscription_count = inner
            .peak_subscription_count
            .max(inner.subscriptions.len());
        Ok(())
    }

    /// Remove every subscription held by the named task and clear its
    /// statistics. Stops the timer worker when no timers remain.
    pub fn unsubscribe(&self, task_name: &str) {
        let has_timers = {
            let mut inner = self.inner.lock();
            inner.stats.retain(|_, s| s.name != task_name);
            inner
                .subscriptions
                .retain(|sub| sub.task.name() != task_name);
            inner.subscriptions.iter().any(|s| s.is_timer())
        };

        if !has_timers {
            if let Some(worker) = self.timer_worker.lock().take() {
                worker.abort();
            }
        }
    }

    fn unique_task_snapshot(&self) -> Vec<Arc<dyn Task>> {
        let inner = self.inner.lock();
        let mut tasks: Vec<Arc<dyn Task>> = Vec::new();
        for sub in &inner.subscriptions {
            if !tasks.iter().any(|t| Arc::ptr_eq(t, &sub.task)) {
                tasks.push(Arc::clone(&sub.task));
            }
        }
        tasks
    }

    // -- lifecycle hooks --------------------------------------------------

    /// Run `on_init` for every subscribed task, once at server start.
    pub async fn run_on_init(&self) {
        for task in self.unique_task_snapshot() {
            if let Err(e) = task.on_init().await {
                warn!(task = task.name(), error = %e, "on_init failed");
            }
        }
    }

    /// Called before every tool/prompt body. Ensures the timer worker is
    /// running, then fans out `on_tool` sequentially. Errors are logged and
    /// do not abort the remaining tasks.
    pub async fn on_tool(self: Arc<Self>) {
        Arc::clone(&self).ensure_timer_worker();

        for (task, _) in self.subscription_snapshot(EventType::all()) {
            if let Err(e) = task.on_tool().await {
                warn!(task = task.name(), error = %e, "on_tool failed");
            }
        }
    }

    fn subscription_snapshot(&self, mask: EventType) -> Vec<(Arc<dyn Task>, EventType)> {
        self.inner
            .lock()
            .subscriptions
            .iter()
            .filter(|sub| sub.event_types.intersects(mask))
            .map(|sub| (Arc::clone(&sub.task), sub.event_types))
            .collect()
    }

    // -- dispatch ---------------------------------------------------------

    /// Fan an event out to every subscription whose mask intersects.
    ///
    /// Handlers run sequentially in subscription order. A handler error is
    /// logged and treated as not-handled. A handled TIMER_ONCE clears the
    /// one-shot flag and interval on that subscription. `last_data` is
    /// updated for every subscription whose mask intersected, including
    /// those whose handler returned false.
    pub async fn dispatch_event(&self, event_type: EventType, data: &EventData) -> DispatchOutcome {
        let matching = self.subscription_snapshot(event_type);
        trace!(?event_type, candidates = matching.len(), "dispatch");

        let mut outcome = DispatchOutcome::default();
        let mut downgrade: Vec<(Arc<dyn Task>, EventType)> = Vec::new();

        for (task, sub_mask) in &matching {
            let handled = match task.handle_event(event_type, data).await {
                Ok(handled) => handled,
                Err(e) => {
                    warn!(task = task.name(), error = %e, "handle_event failed");
                    Handled::No
                }
            };

            if handled.is_handled() {
                outcome.processed = true;
                trace!(task = task.name(), "event handled");

                if event_type.contains(EventType::TIMER_ONCE)
                    && sub_mask.contains(EventType::TIMER_ONCE)
                {
                    downgrade.push((Arc::clone(task), *sub_mask));
                }
            }

            if let Handled::Replace(result) = handled {
                outcome.override_result = Some(result);
            }
        }

        let epoch = self.clock.epoch();
        {
            let mut inner = self.inner.lock();

            for (task, sub_mask) in &downgrade {
                let mut remaining_timer = false;
                for sub in inner.subscriptions.iter_mut() {
                    if sub.is_task(task) && sub.event_types == *sub_mask {
                        trace!(task = task.name(), "clearing TIMER_ONCE");
                        sub.downgrade();
                        remaining_timer = sub.event_types.is_timer();
                        break;
                    }
                }
                if !remaining_timer {
                    let key = task_key(task);
                    if let Some(stats) = inner.stats.get_mut(&key) {
                        stats.downgrade();
                    }
                }
            }

            // Observed invariant: every intersecting subscription counts as
            // having seen data, regardless of its handler's verdict.
            let keys: Vec<String> = inner
                .subscriptions
                .iter()
                .filter(|sub| sub.event_types.intersects(event_type))
                .map(|sub| task_key(&sub.task))
                .collect();
            for key in keys {
                if let Some(stats) = inner.stats.get_mut(&key) {
                    stats.last_data = Some(epoch);
                }
            }
        }

        outcome
    }

    // -- instructions -----------------------------------------------------

    /// Queue an instruction for the next response. Duplicates (by equality)
    /// are dropped.
    pub fn queue_instruction(&self, instruction: impl Into<String>) {
        let instruction = instruction.into();
        let mut inner = self.inner.lock();
        if !inner.pending_instructions.contains(&instruction) {
            inner.pending_instructions.push_back(instruction);
        }
    }

    pub fn pending_instruction_count(&self) -> usize {
        self.inner.lock().pending_instructions.len()
    }

    /// Pipeline post-hook.
    ///
    /// Dispatches `event` first when present. Precedence for shaping the
    /// response: a handler override, then pending workflow change content,
    /// then the head of the instruction queue. The first two suppress
    /// instruction folding for this response.
    pub async fn process_result(
        &self,
        result: ToolResult,
        event: Option<(EventType, EventData)>,
    ) -> ToolResult {
        let mut result = result;

        if let Some((event_type, data)) = event {
            let outcome = self.dispatch_event(event_type, &data).await;
            if let Some(replacement) = outcome.override_result {
                result.value = replacement.value;
                if replacement.message.is_some() {
                    result.message = replacement.message;
                }
                if replacement.instruction.is_some() {
                    result.instruction = replacement.instruction;
                }
                return result;
            }
        }

        if let Some(content) = self.blackboard.lock().workflow_change_content.take() {
            result.value = Some(Value::String(content));
            return result;
        }

        if let Some(instruction) = self.inner.lock().pending_instructions.pop_front() {
            result.additional_agent_instructions = Some(instruction);
        }
        result
    }

    // -- blackboard -------------------------------------------------------

    /// Run a closure against the shared blackboard.
    pub fn with_blackboard<T>(&self, f: impl FnOnce(&mut Blackboard) -> T) -> T {
        f(&mut self.blackboard.lock())
    }

    // -- timers -----------------------------------------------------------

    /// Start the timer worker if timer subscriptions exist and no worker is
    /// running.
    pub fn ensure_timer_worker(self: Arc<Self>) {
        let mut worker = self.timer_worker.lock();
        if worker.as_ref().map(|h| !h.is_finished()).unwrap_or(false) {
            return;
        }
        if !self.inner.lock().subscriptions.iter().any(|s| s.is_timer()) {
            return;
        }

        debug!("starting timer worker");
        let manager = Arc::clone(&self);
        *worker = Some(tokio::spawn(async move {
            loop {
                match manager.run_due_timers().await {
                    Some(sleep_for) => tokio::time::sleep(sleep_for).await,
                    None => break,
                }
            }
            debug!("timer worker exiting, no timer subscriptions remain");
        }));
    }

    /// Fire all due timers once and report how long to sleep before the
    /// next deadline. Returns `None` when no timer subscriptions remain.
    ///
    /// Subscriptions are re-armed before their event is dispatched, so
    /// `next_fire_time` is monotonically non-decreasing as observed by the
    /// worker loop.
    pub async fn run_due_timers(&self) -> Option<Duration> {
        let now = self.clock.now();
        let epoch = self.clock.epoch();

        let due: Vec<(EventType, f64)> = {
            let mut inner = self.inner.lock();
            let mut due = Vec::new();
            for sub in inner.subscriptions.iter_mut() {
                let (Some(interval), Some(fire_at)) = (sub.interval, sub.next_fire_time) else {
                    continue;
                };
                if fire_at <= now {
                    due.push((sub.event_types, interval.as_secs_f64()));
                    sub.rearm(now);
                }
            }

            for (mask, interval) in &due {
                let key = inner
                    .subscriptions
                    .iter()
                    .find(|sub| sub.event_types == *mask)
                    .map(|sub| task_key(&sub.task));
                if let Some(key) = key {
                    inner.total_timer_runs += 1;
                    if let Some(stats) = inner.stats.get_mut(&key) {
                        stats.last_run = Some(epoch);
                        stats.run_count += 1;
                        stats.next_run = Some(epoch + interval);
                    }
                }
            }
            due
        };

        for (mask, interval) in due {
            let payload = EventData::Timer {
                timer_interval: interval,
                timestamp: epoch,
            };
            let _ = self.dispatch_event(mask, &payload).await;
        }

        let next_deadline: Option<Instant> = self
            .inner
            .lock()
            .subscriptions
            .iter()
            .filter_map(|sub| sub.next_fire_time)
            .min();

        next_deadline.map(|deadline| {
            deadline
                .saturating_duration_since(self.clock.now())
                .max(Duration::from_millis(1))
        })
    }

    // -- statistics -------------------------------------------------------

    /// Snapshot of task statistics for template rendering.
    pub fn get_task_statistics(&self) -> TaskStatistics {
        let now = self.clock.epoch();
        let inner = self.inner.lock();

        let mut running = Vec::new();
        let mut timers = Vec::new();
        for stats in inner.stats.values() {
            let view = TaskStatsView::from_stats(stats, now);
            if stats.interval.is_some() {
                timers.push(view.clone());
            }
            running.push(view);
        }

        let mut unique: Vec<*const ()> = inner
            .subscriptions
            .iter()
            .map(|sub| Arc::as_ptr(&sub.task) as *const ())
            .collect();
        unique.sort_unstable();
        unique.dedup();

        TaskStatistics {
            running,
            timers,
            count: unique.len(),
            peak_count: inner.peak_subscription_count,
            total_timer_runs: inner.total_timer_runs,
        }
    }

    /// Number of live subscriptions (diagnostics and tests).
    pub fn subscription_count(&self) -> usize {
        self.inner.lock().subscriptions.len()
    }
}

impl Default for TaskManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Stats key combining the task's name with its identity, so two instances
/// with the same name keep separate records.
fn task_key(task: &Arc<dyn Task>) -> String {
    format!("{}_{:x}", task.name(), Arc::as_ptr(task) as *const () as usize)
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
