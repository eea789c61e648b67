// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Client environment detection.
//!
//! Asks the agent to report its working directory, then derives client
//! facts from the reply for the template context.

use crate::templates::render_task_template;
use async_trait::async_trait;
use gp_config::SessionProvider;
use gp_core::{EventData, EventType, Handled, Task, TaskError};
use gp_engine::TaskManager;
use gp_render::TemplateContextCache;
use parking_lot::Mutex;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, warn};

const TEMPLATE_DIR: &str = "client";

/// Task caching client environment facts reported by the agent.
pub struct ClientInfoTask {
    manager: Arc<TaskManager>,
    sessions: Arc<dyn SessionProvider>,
    cache: Arc<TemplateContextCache>,
    requested: Mutex<bool>,
}

impl ClientInfoTask {
    pub fn new(
        manager: Arc<TaskManager>,
        sessions: Arc<dyn SessionProvider>,
        cache: Arc<TemplateContextCache>,
    ) -> Arc<Self> {
        Arc::new(Self {
            manager,
            sessions,
            cache,
            requested: Mutex::new(false),
        })
    }

    pub fn register(self: Arc<Self>) -> Result<(), gp_engine::EngineError> {
        let task: Arc<dyn Task> = Arc::clone(&self) as Arc<dyn Task>;
        self.manager.subscribe(task, EventType::FS_CWD, None)
    }

    async fn request_client_context(&self) {
        let session = match self.sessions.session().await {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "no session for client context request");
                return;
            }
        };
        match render_task_template(
            &session,
            &self.manager,
            &self.cache,
            TEMPLATE_DIR,
            "client-context-check",
            None,
        )
        .await
        {
            Ok(Some(rendered)) => self.manager.queue_instruction(rendered.content),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "client context template failed"),
        }
    }
}

#[async_trait]
impl Task for ClientInfoTask {
    fn name(&self) -> &str {
        "ClientInfoTask"
    }

    async fn on_tool(&self) -> Result<(), TaskError> {
        let first = {
            let mut requested = self.requested.lock();
            if *requested {
                false
            } else {
                *requested = true;
                true
            }
        };
        if first {
            self.request_client_context().await;
        }
        Ok(())
    }

    async fn handle_event(
        &self,
        _event_type: EventType,
        data: &EventData,
    ) -> Result<Handled, TaskError> {
        let EventData::Cwd { working_directory } = data else {
            return Ok(Handled::No);
        };
        debug!(dir = %working_directory, "client working directory reported");

        // Windows-style paths hint at the client platform
        let windows = working_directory.contains('\\')
            || working_directory
                .as_bytes()
                .get(1)
                .map(|b| *b == b':')
                .unwrap_or(false);

        self.manager.with_blackboard(|bb| {
            bb.client_os_info = Some(json!({
                "family": if windows { "windows" } else { "posix" },
            }));
            bb.client_context_info = Some(json!({
                "working_directory": working_directory,
            }));
        });

        if let Ok(session) = self.sessions.session().await {
            session.set_current_dir(working_directory.clone());
        }
        self.cache.invalidate();

        Ok(Handled::Yes)
    }
}

#[cfg(test)]
#[path = "client_info_tests.rs"]
mod tests;
