// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event types for agent-observation routing.
//!
//! Events are a closed set represented as a bitmask so a single subscription
//! can watch several kinds at once. Bits 17 and above are reserved for
//! per-subscription unique timer identifiers assigned by the task manager.

use serde::{Deserialize, Serialize};

bitflags::bitflags! {
    /// Bit-flag event types for routing agent data to subscribed tasks.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EventType: u64 {
        /// File content delivered by the agent
        const FS_FILE_CONTENT = 1;
        /// Directory listing delivered by the agent
        const FS_DIRECTORY = 1 << 1;
        /// Executable location report from the agent
        const FS_COMMAND = 1 << 2;
        /// Working directory report from the agent
        const FS_CWD = 1 << 3;
        /// Timer that fires once then downgrades to a regular subscription
        const TIMER_ONCE = 1 << 15;
        /// Recurring timer tick
        const TIMER = 1 << 16;

        // Bits 17+ carry per-subscription unique timer ids.
        const _ = !0;
    }
}

impl EventType {
    /// Returns true if this mask includes a timer bit.
    pub fn is_timer(self) -> bool {
        self.intersects(EventType::TIMER | EventType::TIMER_ONCE)
    }

    /// The unique timer bit for the nth timer subscription.
    ///
    /// Shifted above TIMER (bit 16) so unique ids never collide with the
    /// named flags.
    pub fn unique_timer_bit(id: u64) -> EventType {
        EventType::from_bits_retain(id << 17)
    }
}

/// Kind of directory entry reported by the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// Typed payloads dispatched to subscribed tasks.
///
/// Each variant mirrors one callback tool's payload; `Timer` is synthesised
/// by the timer worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventData {
    FileContent {
        path: String,
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mtime: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        encoding: Option<String>,
    },
    Directory {
        path: String,
        files: Vec<DirEntry>,
    },
    Command {
        command: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<String>,
        found: bool,
    },
    Cwd {
        working_directory: String,
    },
    Timer {
        /// Interval of the subscription that fired, in seconds
        timer_interval: f64,
        /// Wall-clock time of the firing, seconds since the epoch
        timestamp: f64,
    },
}

impl EventData {
    /// The mask bit this payload naturally corresponds to.
    pub fn event_type(&self) -> EventType {
        match self {
            EventData::FileContent { .. } => EventType::FS_FILE_CONTENT,
            EventData::Directory { .. } => EventType::FS_DIRECTORY,
            EventData::Command { .. } => EventType::FS_COMMAND,
            EventData::Cwd { .. } => EventType::FS_CWD,
            EventData::Timer { .. } => EventType::TIMER,
        }
    }

    /// Path carried by filesystem payloads, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            EventData::FileContent { path, .. } | EventData::Directory { path, .. } => {
                Some(path.as_str())
            }
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
