// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-project runtime session.
//!
//! A session owns the lazily loaded project value and a listener list.
//! Sessions are stored task-locally by the server; this type itself is
//! runtime-agnostic.

use crate::error::ConfigError;
use crate::model::{Project, SessionState};
use crate::store::ConfigManager;
use crate::validate::validate_project_name;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Listener notified when the active session or its config changes.
pub trait SessionListener: Send + Sync {
    fn on_session_changed(&self, project_name: &str);
    fn on_config_changed(&self, project_name: &str);
}

/// Resolves the current session for components that run outside a request
/// context (background tasks).
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn session(&self) -> Result<Arc<Session>, ConfigError>;
}

/// Provider returning one fixed session; the degenerate single-project
/// case and the test default.
pub struct StaticSessionProvider(pub Arc<Session>);

#[async_trait]
impl SessionProvider for StaticSessionProvider {
    async fn session(&self) -> Result<Arc<Session>, ConfigError> {
        Ok(Arc::clone(&self.0))
    }
}

/// Per-project runtime state.
pub struct Session {
    config: ConfigManager,
    project_name: String,
    cached_project: Mutex<Option<Arc<Project>>>,
    state: Mutex<SessionState>,
    listeners: Mutex<Vec<Arc<dyn SessionListener>>>,
}

impl Session {
    /// Create a session. The project name is validated immediately.
    pub fn new(config: ConfigManager, project_name: impl Into<String>) -> Result<Self, ConfigError> {
        let project_name = project_name.into();
        validate_project_name(&project_name)?;
        Ok(Self {
            config,
            project_name,
            cached_project: Mutex::new(None),
            state: Mutex::new(SessionState::default()),
            listeners: Mutex::new(Vec::new()),
        })
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn config(&self) -> &ConfigManager {
        &self.config
    }

    pub fn docroot(&self) -> PathBuf {
        self.config.docroot()
    }

    /// Project configuration, loaded on first access and cached.
    ///
    /// Two calls without an intervening `update_config` or
    /// `invalidate_cache` return the same `Arc`.
    pub async fn project(&self) -> Result<Arc<Project>, ConfigError> {
        if let Some(project) = self.cached_project.lock().clone() {
            return Ok(project);
        }
        let loaded = Arc::new(self.config.get_or_create_project(&self.project_name).await?);
        let mut cached = self.cached_project.lock();
        // A concurrent loader may have won; keep its value for reference
        // identity across callers.
        if let Some(existing) = cached.clone() {
            return Ok(existing);
        }
        *cached = Some(Arc::clone(&loaded));
        Ok(loaded)
    }

    /// Apply a functional update, persist it atomically, then swap the cache
    /// and notify listeners.
    pub async fn update_config<F>(&self, updater: F) -> Result<(), ConfigError>
    where
        F: FnOnce(Project) -> Project + Send,
    {
        let current = self.project().await?;
        let updated = updater((*current).clone());
        updated.validate()?;
        self.config.save_project(&updated).await?;
        *self.cached_project.lock() = Some(Arc::new(updated));

        for listener in self.listeners.lock().iter() {
            listener.on_config_changed(&self.project_name);
        }
        Ok(())
    }

    /// Drop the cached project so the next access reloads from disk.
    pub fn invalidate_cache(&self) {
        *self.cached_project.lock() = None;
    }

    pub fn add_listener(&self, listener: Arc<dyn SessionListener>) {
        let mut listeners = self.listeners.lock();
        if !listeners.iter().any(|l| Arc::ptr_eq(l, &listener)) {
            listeners.push(listener);
        }
    }

    pub fn remove_listener(&self, listener: &Arc<dyn SessionListener>) {
        self.listeners.lock().retain(|l| !Arc::ptr_eq(l, listener));
    }

    /// Notify listeners that this session became the active one.
    pub fn notify_session_changed(&self) {
        debug!(project = %self.project_name, "session changed");
        for listener in self.listeners.lock().iter() {
            listener.on_session_changed(&self.project_name);
        }
    }

    /// Working directory last reported by the agent.
    pub fn current_dir(&self) -> Option<String> {
        self.state.lock().current_dir.clone()
    }

    pub fn set_current_dir(&self, dir: impl Into<String>) {
        self.state.lock().current_dir = Some(dir.into());
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
