//! Shared fixtures for the workspace specs.

use async_trait::async_trait;
use gp_core::{EventData, EventType, FakeClock, Handled, Task, TaskError, ToolResult};
use gp_engine::TaskManager;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// What a probe should report for each event.
#[derive(Clone, Copy)]
pub enum Reply {
    Ignored,
    Handled,
    Failing,
}

/// Recording task used across the coordinator specs.
pub struct Probe {
    name: String,
    reply: Reply,
    pub events: Mutex<Vec<EventData>>,
    pub calls: AtomicUsize,
    /// Instruction queued on every event, when set
    pub instruction: Mutex<Option<String>>,
    manager: Mutex<Option<Arc<TaskManager>>>,
}

impl Probe {
    pub fn new(name: &str, reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            reply,
            events: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            instruction: Mutex::new(None),
            manager: Mutex::new(None),
        })
    }

    pub fn with_instruction(self: Arc<Self>, manager: &Arc<TaskManager>, text: &str) -> Arc<Self> {
        *self.instruction.lock() = Some(text.to_string());
        *self.manager.lock() = Some(Arc::clone(manager));
        self
    }

    pub fn event_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Task for Probe {
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle_event(
        &self,
        _event_type: EventType,
        data: &EventData,
    ) -> Result<Handled, TaskError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.events.lock().push(data.clone());

        if let (Some(instruction), Some(manager)) = (
            self.instruction.lock().clone(),
            self.manager.lock().clone(),
        ) {
            manager.queue_instruction(instruction);
        }

        match self.reply {
            Reply::Ignored => Ok(Handled::No),
            Reply::Handled => Ok(Handled::Yes),
            Reply::Failing => Err(TaskError::from("probe failure")),
        }
    }
}

/// Manager driven by a fake clock.
pub fn manager_with_clock() -> (Arc<TaskManager>, FakeClock) {
    let clock = FakeClock::new();
    let manager = Arc::new(TaskManager::with_clock(Arc::new(clock.clone())));
    (manager, clock)
}

pub fn cwd_event() -> EventData {
    EventData::Cwd {
        working_directory: "/work/repo".to_string(),
    }
}

pub fn ok_result(value: &str) -> ToolResult {
    ToolResult::ok(value)
}
