// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! OpenSpec CLI detection and change tracking.

use crate::templates::render_task_template;
use async_trait::async_trait;
use gp_config::flags::FLAG_OPENSPEC;
use gp_config::{resolve_flag, SessionProvider};
use gp_core::{
    group_changes, ChangeEntry, EventData, EventType, GroupedChanges, Handled, Task, TaskError,
    ToolResult,
};
use gp_engine::TaskManager;
use gp_render::{version_at_least, ContextChain, TemplateContextCache};
use parking_lot::Mutex;
use regex::Regex;
use serde_json::Value;
use std::path::Path;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Changes cache considered fresh for this long.
pub const CHANGES_CACHE_TTL: f64 = 3600.0;
/// Recurring staleness check interval.
pub const CHANGES_CHECK_INTERVAL: Duration = Duration::from_secs(3600);
/// One-shot startup delay before the first check.
pub const STARTUP_DELAY: Duration = Duration::from_secs(20);

const TEMPLATE_DIR: &str = "openspec";

fn version_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        #[allow(clippy::expect_used)]
        Regex::new(r"v?(\d+\.\d+\.\d+)").expect("static regex")
    })
}

#[derive(Default)]
struct OpenSpecState {
    available: Option<bool>,
    project_enabled: Option<bool>,
    project_requested: bool,
    version: Option<String>,
    version_this_session: Option<String>,
    changes: Option<Vec<ChangeEntry>>,
    changes_at: Option<f64>,
}

/// Task detecting the OpenSpec CLI and tracking its change list.
pub struct OpenSpecTask {
    manager: Arc<TaskManager>,
    sessions: Arc<dyn SessionProvider>,
    cache: Arc<TemplateContextCache>,
    state: Mutex<OpenSpecState>,
}

impl OpenSpecTask {
    pub fn new(
        manager: Arc<TaskManager>,
        sessions: Arc<dyn SessionProvider>,
        cache: Arc<TemplateContextCache>,
    ) -> Arc<Self> {
        Arc::new(Self {
            manager,
            sessions,
            cache,
            state: Mutex::new(OpenSpecState::default()),
        })
    }

    /// Subscribe to command, file, and timer events.
    pub fn register(self: Arc<Self>) -> Result<(), gp_engine::EngineError> {
        let task: Arc<dyn Task> = Arc::clone(&self) as Arc<dyn Task>;
        self.manager.subscribe(
            Arc::clone(&task),
            EventType::FS_COMMAND | EventType::FS_FILE_CONTENT | EventType::TIMER,
            Some(CHANGES_CHECK_INTERVAL),
        )?;
        // One-shot startup check shortly after boot
        self.manager
            .subscribe(task, EventType::TIMER_ONCE, Some(STARTUP_DELAY))
    }

    pub fn is_available(&self) -> Option<bool> {
        self.state.lock().available
    }

    pub fn is_project_enabled(&self) -> Option<bool> {
        self.state.lock().project_enabled
    }

    pub fn get_version(&self) -> Option<String> {
        self.state.lock().version.clone()
    }

    /// Semver comparison, tolerating a leading `v` on either side.
    pub fn meets_minimum_version(&self, minimum: &str) -> bool {
        match self.get_version() {
            Some(version) => version_at_least(&version, minimum),
            None => false,
        }
    }

    /// Cached changes grouped by status, or `None` when the cache is stale.
    pub fn get_changes(&self) -> Option<GroupedChanges> {
        if !self.is_cache_valid(CHANGES_CACHE_TTL) {
            return None;
        }
        let state = self.state.lock();
        let entries = state.changes.as_deref().unwrap_or_default();
        Some(group_changes(entries, self.manager.clock().epoch()))
    }

    pub fn is_cache_valid(&self, ttl: f64) -> bool {
        let state = self.state.lock();
        match (state.changes.as_ref(), state.changes_at) {
            (Some(_), Some(at)) => self.manager.clock().epoch() - at < ttl,
            _ => false,
        }
    }

    async fn queue_template(&self, name: &str, extra: Option<ContextChain>) {
        let session = match self.sessions.session().await {
            Ok(session) => session,
            Err(e) => {
                warn!(template = name, error = %e, "no session for template");
                return;
            }
        };
        match render_task_template(&session, &self.manager, &self.cache, TEMPLATE_DIR, name, extra)
            .await
        {
            Ok(Some(rendered)) => self.manager.queue_instruction(rendered.content),
            Ok(None) => debug!(template = name, "template filtered by requires-flag"),
            Err(e) => warn!(template = name, error = %e, "template render failed"),
        }
    }

    async fn request_cli_check(&self) {
        self.queue_template("openspec-cli-check", None).await;
    }

    async fn request_project_check(&self) {
        self.queue_template("openspec-project-check", None).await;
    }

    async fn request_version_check(&self) {
        self.queue_template("openspec-version-check", None).await;
    }

    async fn request_changes_json(&self) {
        self.queue_template("list", None).await;
    }

    /// Refresh the changes cache when stale.
    async fn handle_changes_reminder(&self) {
        if !self.is_cache_valid(CHANGES_CACHE_TTL) {
            self.request_changes_json().await;
        }
    }

    async fn handle_command_report(&self, path: Option<&str>, found: bool) {
        let available = found && path.map(|p| !p.is_empty()).unwrap_or(false);
        let request_project = {
            let mut state = self.state.lock();
            state.available = Some(available);
            if available && !state.project_requested {
                state.project_requested = true;
                true
            } else {
                false
            }
        };
        self.manager
            .with_blackboard(|bb| bb.openspec_available = Some(available));
        info!(available, "openspec cli availability");

        if request_project {
            self.request_project_check().await;
        }
    }

    /// Extract and persist the CLI version from `openspec --version` output.
    async fn parse_version(&self, content: &str) {
        let extracted = version_regex()
            .captures(content)
            .map(|captures| captures[1].to_string());

        match extracted {
            Some(version) => {
                {
                    let mut state = self.state.lock();
                    state.version = Some(version.clone());
                    state.version_this_session = Some(version.clone());
                }
                self.manager
                    .with_blackboard(|bb| bb.openspec_version = Some(version.clone()));
                info!(version = %version, "openspec version");

                if let Ok(session) = self.sessions.session().await {
                    let persisted = session
                        .project()
                        .await
                        .ok()
                        .and_then(|p| p.openspec_version.clone());
                    if persisted.as_deref() != Some(version.as_str()) {
                        let stored = version.clone();
                        if let Err(e) = session
                            .update_config(move |mut project| {
                                project.openspec_version = Some(stored);
                                project
                            })
                            .await
                        {
                            warn!(error = %e, "failed to persist openspec version");
                        }
                    }
                }
            }
            None => {
                warn!(content, "failed to parse openspec version");
                let mut state = self.state.lock();
                state.version = None;
                state.version_this_session = None;
                drop(state);
                self.manager.with_blackboard(|bb| bb.openspec_version = None);
            }
        }
    }

    /// Cache the changes list, persist first-time validation, and hand the
    /// rendered listing back as the response value.
    async fn handle_changes_json(&self, json: &Value) -> Result<Handled, TaskError> {
        let mut entries: Vec<ChangeEntry> = json
            .get("changes")
            .cloned()
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| TaskError(format!("invalid changes payload: {}", e)))?
            .unwrap_or_default();
        for entry in &mut entries {
            entry.annotate();
        }
        debug!(count = entries.len(), "cached openspec changes");

        let now = self.manager.clock().epoch();
        {
            let mut state = self.state.lock();
            state.changes = Some(entries.clone());
            state.changes_at = Some(now);
        }
        self.manager.with_blackboard(|bb| {
            bb.openspec_changes = Some(entries);
            bb.openspec_changes_at = Some(now);
        });

        if let Ok(session) = self.sessions.session().await {
            let validated = session
                .project()
                .await
                .map(|p| p.openspec_validated)
                .unwrap_or(false);
            if !validated {
                if let Err(e) = session
                    .update_config(|mut project| {
                        project.openspec_validated = true;
                        project
                    })
                    .await
                {
                    warn!(error = %e, "failed to persist openspec validation");
                } else {
                    info!("openspec validation completed and persisted");
                }
            }
        }

        // Fresh changes must be visible to the next render
        self.cache.invalidate();

        let session = self
            .sessions
            .session()
            .await
            .map_err(|e| TaskError(e.to_string()))?;
        match render_task_template(
            &session,
            &self.manager,
            &self.cache,
            TEMPLATE_DIR,
            "_openspec-list-format",
            None,
        )
        .await
        {
            Ok(Some(rendered)) => Ok(Handled::Replace(
                ToolResult::ok(rendered.content.clone())
                    .with_message("OpenSpec changes cached")
                    .with_instruction(rendered.instruction.unwrap_or_default()),
            )),
            Ok(None) => Ok(Handled::No),
            Err(e) => {
                warn!(error = %e, "failed to render changes list");
                Ok(Handled::No)
            }
        }
    }

    async fn handle_file_content(&self, path: &str, content: &str) -> Result<Handled, TaskError> {
        let basename = Path::new(path)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        if basename == ".openspec-version.txt" {
            self.parse_version(content).await;
            return Ok(Handled::Yes);
        }

        if path == "openspec/project.md" || path.ends_with("/openspec/project.md") {
            {
                let mut state = self.state.lock();
                state.project_enabled = Some(true);
            }
            self.manager
                .with_blackboard(|bb| bb.openspec_project_enabled = Some(true));
            self.request_version_check().await;
            self.request_changes_json().await;
            return Ok(Handled::Yes);
        }

        let Ok(json) = serde_json::from_str::<Value>(content) else {
            debug!(file = %basename, "non-JSON content, skipping");
            return Ok(Handled::No);
        };

        if json.get("error").is_some() {
            self.queue_template("_error-format", Some(ContextChain::new(json)))
                .await;
            return Ok(Handled::Yes);
        }

        match basename.as_str() {
            ".openspec-status.json" => {
                self.queue_template("_status-format", Some(ContextChain::new(json)))
                    .await;
                Ok(Handled::Yes)
            }
            ".openspec-changes.json" => self.handle_changes_json(&json).await,
            ".openspec-show.json" => {
                self.queue_template("_show-format", Some(ContextChain::new(json)))
                    .await;
                Ok(Handled::Yes)
            }
            _ => Ok(Handled::No),
        }
    }
}

#[async_trait]
impl Task for OpenSpecTask {
    fn name(&self) -> &str {
        "OpenSpecTask"
    }

    /// Flag gate, persisted-state load, and the initial round of requests.
    async fn on_init(&self) -> Result<(), TaskError> {
        let session = self
            .sessions
            .session()
            .await
            .map_err(|e| TaskError(e.to_string()))?;

        let enabled = resolve_flag(&session, FLAG_OPENSPEC)
            .await
            .map_err(|e| TaskError(e.to_string()))?
            .map(|v| v.is_enabled())
            .unwrap_or(false);
        if !enabled {
            self.manager.unsubscribe(self.name());
            debug!("OpenSpecTask disabled, {} flag not set", FLAG_OPENSPEC);
            return Ok(());
        }

        let project = session
            .project()
            .await
            .map_err(|e| TaskError(e.to_string()))?;

        // Persisted version is trusted until re-verified this session
        if let Some(version) = &project.openspec_version {
            self.state.lock().version = Some(version.clone());
            self.manager
                .with_blackboard(|bb| bb.openspec_version = Some(version.clone()));
            debug!(version = %version, "loaded persisted openspec version");
        }

        if self.state.lock().version_this_session.is_none() {
            self.request_version_check().await;
        }

        if project.openspec_validated {
            self.request_changes_json().await;
        } else {
            self.request_cli_check().await;
        }
        Ok(())
    }

    async fn handle_event(
        &self,
        event_type: EventType,
        data: &EventData,
    ) -> Result<Handled, TaskError> {
        if event_type.is_timer() {
            if let EventData::Timer { .. } = data {
                self.handle_changes_reminder().await;
                return Ok(Handled::Yes);
            }
        }

        match data {
            EventData::Command {
                command,
                path,
                found,
            } if command == "openspec" => {
                self.handle_command_report(path.as_deref(), *found).await;
                Ok(Handled::Yes)
            }
            EventData::FileContent { path, content, .. } => {
                self.handle_file_content(path, content).await
            }
            _ => Ok(Handled::No),
        }
    }
}

#[cfg(test)]
#[path = "openspec_tests.rs"]
mod tests;
