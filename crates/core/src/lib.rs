// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! gp-core: Core library for the Guidepost MCP server

pub mod clock;
pub mod event;
pub mod openspec;
pub mod result;
pub mod subscription;
pub mod task;
pub mod time_fmt;
pub mod workflow;

pub use clock::{Clock, FakeClock, SystemClock};
pub use event::{DirEntry, EntryKind, EventData, EventType};
pub use openspec::{group_changes, ChangeEntry, GroupedChange, GroupedChanges};
pub use result::{ErrorKind, ToolResult};
pub use subscription::Subscription;
pub use task::{Handled, Task, TaskError};
pub use time_fmt::{format_duration, humanize_age};
pub use workflow::{ChangeEvent, WorkflowState};
