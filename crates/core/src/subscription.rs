// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subscription records for the pub/sub system.

use crate::event::EventType;
use crate::task::Task;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A subscription holding a strong reference to its task.
///
/// Invariant: when `interval` is set, `event_types` includes TIMER (or
/// TIMER_ONCE) plus a unique high bit, and `next_fire_time` is armed.
#[derive(Clone)]
pub struct Subscription {
    pub task: Arc<dyn Task>,
    pub event_types: EventType,
    pub interval: Option<Duration>,
    pub next_fire_time: Option<Instant>,
    /// Mask as requested by the subscriber, before timer bits were added
    pub original_event_types: EventType,
    /// Unique timer id bit, empty for regular subscriptions
    pub unique_timer_bit: EventType,
}

impl Subscription {
    /// Regular subscription without timer support.
    pub fn regular(task: Arc<dyn Task>, event_types: EventType) -> Self {
        Self {
            task,
            event_types,
            interval: None,
            next_fire_time: None,
            original_event_types: event_types,
            unique_timer_bit: EventType::empty(),
        }
    }

    /// Timer subscription armed to fire `interval` from `now`.
    pub fn timer(
        task: Arc<dyn Task>,
        event_types: EventType,
        interval: Duration,
        unique_timer_bit: EventType,
        now: Instant,
    ) -> Self {
        Self {
            task,
            event_types: event_types | EventType::TIMER | unique_timer_bit,
            interval: Some(interval),
            next_fire_time: Some(now + interval),
            original_event_types: event_types,
            unique_timer_bit,
        }
    }

    pub fn is_timer(&self) -> bool {
        self.interval.is_some()
    }

    /// Re-arm the timer after a firing.
    pub fn rearm(&mut self, now: Instant) {
        if let Some(interval) = self.interval {
            self.next_fire_time = Some(now + interval);
        }
    }

    /// Drop timer behaviour, turning this into a regular subscription.
    ///
    /// Applied when a TIMER_ONCE event is handled. The mask reverts to what
    /// the subscriber originally asked for, minus the one-shot flag.
    pub fn downgrade(&mut self) {
        self.event_types =
            (self.original_event_types & !EventType::TIMER_ONCE) | self.unique_timer_bit;
        self.interval = None;
        self.next_fire_time = None;
    }

    /// Identity check against another subscription's task.
    pub fn is_task(&self, task: &Arc<dyn Task>) -> bool {
        Arc::ptr_eq(&self.task, task)
    }
}

#[cfg(test)]
#[path = "subscription_tests.rs"]
mod tests;
