// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scheduled monitoring of the project workflow file.

use crate::changes::detect_workflow_changes;
use crate::parser::parse_workflow_state;
use crate::templates::render_task_template;
use async_trait::async_trait;
use gp_config::flags::FLAG_WORKFLOW_FILE;
use gp_config::{resolve_flag, substitute_variables, SessionProvider, DEFAULT_WORKFLOW_FILE};
use gp_core::{ChangeEvent, EntryKind, EventData, EventType, Handled, Task, TaskError};
use gp_engine::TaskManager;
use gp_render::TemplateContextCache;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Workflow monitoring interval.
pub const WORKFLOW_INTERVAL: Duration = Duration::from_secs(600);
/// OpenSpec reminder interval.
pub const OPENSPEC_INTERVAL: Duration = Duration::from_secs(3600);
/// Cached openspec/changes listing is trusted for this long.
pub const OPENSPEC_CACHE_TTL: f64 = 86_400.0;

const OPENSPEC_CHANGES_PATH: &str = "openspec/changes";
const TEMPLATE_DIR: &str = "workflow";

#[derive(Default)]
struct MonitorState {
    setup_done: bool,
    workflow_file: Option<String>,
}

/// Background task watching the workflow file for semantic changes.
pub struct WorkflowMonitorTask {
    manager: Arc<TaskManager>,
    sessions: Arc<dyn SessionProvider>,
    cache: Arc<TemplateContextCache>,
    state: Mutex<MonitorState>,
}

impl WorkflowMonitorTask {
    pub fn new(
        manager: Arc<TaskManager>,
        sessions: Arc<dyn SessionProvider>,
        cache: Arc<TemplateContextCache>,
    ) -> Arc<Self> {
        Arc::new(Self {
            manager,
            sessions,
            cache,
            state: Mutex::new(MonitorState::default()),
        })
    }

    /// Subscribe for workflow monitoring, openspec reminders, and directory
    /// listings.
    pub fn register(self: Arc<Self>) -> Result<(), gp_engine::EngineError> {
        let task: Arc<dyn Task> = Arc::clone(&self) as Arc<dyn Task>;
        self.manager.subscribe(
            Arc::clone(&task),
            EventType::TIMER | EventType::FS_FILE_CONTENT,
            Some(WORKFLOW_INTERVAL),
        )?;
        self.manager
            .subscribe(Arc::clone(&task), EventType::TIMER, Some(OPENSPEC_INTERVAL))?;
        self.manager
            .subscribe(task, EventType::FS_DIRECTORY, None)
    }

    /// The workflow file name, resolved from the `workflow-file` flag once.
    async fn workflow_file(&self) -> String {
        if let Some(file) = self.state.lock().workflow_file.clone() {
            return file;
        }

        let resolved = match self.sessions.session().await {
            Ok(session) => {
                let flag = resolve_flag(&session, FLAG_WORKFLOW_FILE).await.ok().flatten();
                match (flag, session.project().await) {
                    (Some(value), Ok(project)) => value
                        .as_str()
                        .map(|template| {
                            substitute_variables(
                                template,
                                &project.name,
                                &project.key,
                                &project.hash,
                            )
                        })
                        .unwrap_or_else(|| DEFAULT_WORKFLOW_FILE.to_string()),
                    _ => DEFAULT_WORKFLOW_FILE.to_string(),
                }
            }
            Err(_) => DEFAULT_WORKFLOW_FILE.to_string(),
        };

        self.state.lock().workflow_file = Some(resolved.clone());
        resolved
    }

    async fn queue_template(&self, name: &str) {
        let session = match self.sessions.session().await {
            Ok(session) => session,
            Err(e) => {
                warn!(template = name, error = %e, "no session for template");
                return;
            }
        };
        match render_task_template(&session, &self.manager, &self.cache, TEMPLATE_DIR, name, None)
            .await
        {
            Ok(Some(rendered)) => self.manager.queue_instruction(rendered.content),
            Ok(None) => debug!(template = name, "template filtered by requires-flag"),
            Err(e) => warn!(template = name, error = %e, "template render failed"),
        }
    }

    async fn handle_monitoring_reminder(&self) {
        self.queue_template("monitoring-reminder").await;
    }

    async fn handle_openspec_reminder(&self) {
        self.queue_template("openspec-changes-check").await;
        trace!("queued openspec changes check reminder");
    }

    /// Cache directory names from an openspec/changes listing.
    fn handle_changes_listing(&self, files: &[gp_core::DirEntry]) {
        let names: Vec<String> = files
            .iter()
            .filter(|entry| entry.kind == EntryKind::Directory)
            .map(|entry| entry.name.clone())
            .collect();
        trace!(count = names.len(), "cached openspec changes listing");

        let now = self.manager.clock().epoch();
        self.manager.with_blackboard(|bb| {
            bb.openspec_changes_list = Some(names);
            bb.openspec_changes_list_at = Some(now);
        });
    }

    /// Parse workflow content, surface semantic changes, and refresh caches.
    async fn process_workflow_content(&self, content: &str) {
        let Some(new_state) = parse_workflow_state(content) else {
            warn!("failed to parse workflow state, not processing changes");
            return;
        };
        trace!(phase = ?new_state.phase, issue = ?new_state.issue, "parsed workflow state");

        let old_state = self.manager.with_blackboard(|bb| bb.workflow_state.clone());
        let changes = detect_workflow_changes(old_state.as_ref(), &new_state);
        trace!(count = changes.len(), "detected workflow changes");

        if !changes.is_empty() {
            if let Some(rendered) = self.render_changes(&changes).await {
                self.manager
                    .with_blackboard(|bb| bb.workflow_change_content = Some(rendered));
            }
        }

        // The monitoring instruction is always re-queued after a successful
        // parse so the agent keeps sending file content.
        self.queue_template("monitoring-result").await;

        let issue_changed = old_state
            .as_ref()
            .map(|old| old.issue != new_state.issue)
            .unwrap_or(false);
        let issue = new_state.issue.clone();

        self.manager
            .with_blackboard(|bb| bb.workflow_state = Some(new_state));

        if issue_changed {
            trace!("issue changed, requesting openspec listing refresh");
            self.queue_template("openspec-changes-check").await;
        }

        let is_openspec = self.detect_openspec_change(issue.as_deref()).await;
        self.manager
            .with_blackboard(|bb| bb.openspec_current_change = Some(is_openspec));
    }

    /// Whether the issue names a directory in the cached openspec/changes
    /// listing. An expired or missing cache triggers a refresh request and
    /// reports false.
    async fn detect_openspec_change(&self, issue: Option<&str>) -> bool {
        let Some(issue) = issue else {
            return false;
        };

        let now = self.manager.clock().epoch();
        let cached = self.manager.with_blackboard(|bb| {
            let expired = bb
                .openspec_changes_list_at
                .map(|at| now - at > OPENSPEC_CACHE_TTL)
                .unwrap_or(true);
            if expired {
                None
            } else {
                bb.openspec_changes_list.clone()
            }
        });

        match cached {
            Some(names) => names.iter().any(|name| name == issue),
            None => {
                self.queue_template("openspec-changes-check").await;
                false
            }
        }
    }

    async fn render_changes(&self, changes: &[ChangeEvent]) -> Option<String> {
        let session = self.sessions.session().await.ok()?;
        let mut rendered = Vec::new();
        for change in changes {
            match render_task_template(
                &session,
                &self.manager,
                &self.cache,
                TEMPLATE_DIR,
                change.template_name(),
                None,
            )
            .await
            {
                Ok(Some(content)) => rendered.push(content.content),
                Ok(None) => {}
                Err(e) => {
                    warn!(template = change.template_name(), error = %e, "change template failed")
                }
            }
        }
        if rendered.is_empty() {
            None
        } else {
            Some(rendered.join("\n"))
        }
    }
}

#[async_trait]
impl Task for WorkflowMonitorTask {
    fn name(&self) -> &str {
        "WorkflowMonitorTask"
    }

    /// Queue the one-time monitoring setup instruction.
    async fn on_tool(&self) -> Result<(), TaskError> {
        let setup_needed = {
            let mut state = self.state.lock();
            if state.setup_done {
                false
            } else {
                state.setup_done = true;
                true
            }
        };
        if setup_needed {
            self.queue_template("monitoring-setup").await;
            trace!("queued workflow monitoring setup");
        }
        Ok(())
    }

    async fn handle_event(
        &self,
        _event_type: EventType,
        data: &EventData,
    ) -> Result<Handled, TaskError> {
        match data {
            EventData::Timer { timer_interval, .. } => {
                if *timer_interval == OPENSPEC_INTERVAL.as_secs_f64() {
                    self.handle_openspec_reminder().await;
                    return Ok(Handled::Yes);
                }
                if *timer_interval == WORKFLOW_INTERVAL.as_secs_f64() {
                    self.handle_monitoring_reminder().await;
                    return Ok(Handled::Yes);
                }
                Ok(Handled::No)
            }
            EventData::Directory { path, files } if path == OPENSPEC_CHANGES_PATH => {
                self.handle_changes_listing(files);
                Ok(Handled::Yes)
            }
            EventData::FileContent { path, content, .. } => {
                let watched = self.workflow_file().await;
                let watched_name = Path::new(&watched)
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or(watched);
                let basename = Path::new(path)
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                if basename == watched_name {
                    self.process_workflow_content(content).await;
                    return Ok(Handled::Yes);
                }
                Ok(Handled::No)
            }
            _ => Ok(Handled::No),
        }
    }
}

#[cfg(test)]
#[path = "workflow_tests.rs"]
mod tests;
