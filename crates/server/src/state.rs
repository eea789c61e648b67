// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-wide server state and task wiring.

use crate::pipeline::{tool_prefix, ToolRegistry};
use async_trait::async_trait;
use gp_config::{ConfigError, ConfigManager, Session, SessionProvider};
use gp_engine::TaskManager;
use gp_fsbridge::FileCache;
use gp_render::TemplateContextCache;
use gp_tasks::{ClientInfoTask, OpenSpecTask, WorkflowMonitorTask};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

/// Shared state wired into every tool invocation.
pub struct ServerState {
    pub manager: Arc<TaskManager>,
    pub config: ConfigManager,
    pub file_cache: Arc<FileCache>,
    pub context_cache: Arc<TemplateContextCache>,
    pub registry: ToolRegistry,
    /// Sessions shared with background tasks, keyed by project name
    pub(crate) sessions: Mutex<HashMap<String, Arc<Session>>>,
    /// Project used when no name can be resolved from the request
    pub default_project: Mutex<Option<String>>,
    security_violations: AtomicU64,
}

impl ServerState {
    pub fn new(config: ConfigManager) -> Arc<Self> {
        Arc::new(Self {
            manager: Arc::new(TaskManager::new()),
            config,
            file_cache: Arc::new(FileCache::new()),
            context_cache: Arc::new(TemplateContextCache::new(tool_prefix())),
            registry: ToolRegistry::new(),
            sessions: Mutex::new(HashMap::new()),
            default_project: Mutex::new(None),
            security_violations: AtomicU64::new(0),
        })
    }

    /// Register the reference task set and run their init hooks.
    pub async fn start_tasks(self: Arc<Self>) -> Result<(), gp_engine::EngineError> {
        let provider: Arc<dyn SessionProvider> = Arc::new(StateSessionProvider {
            state: Arc::downgrade(&self),
        });

        let openspec = OpenSpecTask::new(
            Arc::clone(&self.manager),
            Arc::clone(&provider),
            Arc::clone(&self.context_cache),
        );
        openspec.register()?;

        let workflow = WorkflowMonitorTask::new(
            Arc::clone(&self.manager),
            Arc::clone(&provider),
            Arc::clone(&self.context_cache),
        );
        workflow.register()?;

        let client_info = ClientInfoTask::new(
            Arc::clone(&self.manager),
            Arc::clone(&provider),
            Arc::clone(&self.context_cache),
        );
        client_info.register()?;

        info!(
            subscriptions = self.manager.subscription_count(),
            "tasks registered"
        );
        self.manager.run_on_init().await;
        Ok(())
    }

    /// Record security violations observed by a per-request policy.
    pub fn record_violations(&self, count: u64) {
        if count > 0 {
            self.security_violations.fetch_add(count, Ordering::Relaxed);
        }
    }

    pub fn security_violation_count(&self) -> u64 {
        self.security_violations.load(Ordering::Relaxed)
    }
}

/// Session resolution for background tasks running outside a request.
struct StateSessionProvider {
    state: std::sync::Weak<ServerState>,
}

#[async_trait]
impl SessionProvider for StateSessionProvider {
    async fn session(&self) -> Result<Arc<Session>, ConfigError> {
        let state = self
            .state
            .upgrade()
            .ok_or_else(|| ConfigError::NoSession("server state dropped".to_string()))?;
        crate::session::get_or_create_session(&state, None).await
    }
}
