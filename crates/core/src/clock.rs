// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstractions for testable time.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Source of monotonic and wall-clock time.
pub trait Clock: Send + Sync + 'static {
    /// Monotonic instant used for timer scheduling.
    fn now(&self) -> Instant;

    /// Wall-clock seconds since the Unix epoch, used for statistics and
    /// cache timestamps.
    fn epoch(&self) -> f64;
}

/// Production clock backed by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn epoch(&self) -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs_f64()
    }
}

/// Manually advanced clock for tests.
///
/// Clones share the same offset, so a clock handed to the unit under test
/// can be advanced from the test body.
#[derive(Debug, Clone)]
pub struct FakeClock {
    start: Instant,
    epoch_base: f64,
    offset: Arc<Mutex<Duration>>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            epoch_base: 1_700_000_000.0,
            offset: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    /// Advance virtual time.
    pub fn advance(&self, duration: Duration) {
        let mut offset = self.offset.lock();
        *offset += duration;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.start + *self.offset.lock()
    }

    fn epoch(&self) -> f64 {
        self.epoch_base + self.offset.lock().as_secs_f64()
    }
}
