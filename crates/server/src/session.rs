// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task-local session resolution.
//!
//! Each request runs inside a task-local session scope, giving concurrent
//! requests isolated `{project name → Session}` maps without locking. The
//! map is copied before mutation so a child scope never aliases its
//! parent's. Sessions themselves are shared process-wide so background
//! tasks observe the same project state.

use crate::state::ServerState;
use gp_config::{ConfigError, Session};
use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

tokio::task_local! {
    static ACTIVE_SESSIONS: RefCell<HashMap<String, Arc<Session>>>;
}

/// Run a future inside a fresh task-local session scope.
pub async fn session_scope<F: Future>(f: F) -> F::Output {
    ACTIVE_SESSIONS.scope(RefCell::new(HashMap::new()), f).await
}

/// Session for `project_name` from the task-local map, if inside a scope.
/// With no name, returns the first available session.
pub fn current_session(project_name: Option<&str>) -> Option<Arc<Session>> {
    ACTIVE_SESSIONS
        .try_with(|sessions| {
            let sessions = sessions.borrow();
            match project_name {
                Some(name) => sessions.get(name).cloned(),
                None => sessions.values().next().cloned(),
            }
        })
        .ok()
        .flatten()
}

/// Store a session in the task-local map. The map is copied before the
/// insertion to avoid mutating a parent context's map in place.
pub fn set_current_session(session: Arc<Session>) {
    let _ = ACTIVE_SESSIONS.try_with(|sessions| {
        let mut copied: HashMap<String, Arc<Session>> = sessions.borrow().clone();
        copied.insert(session.project_name().to_string(), session);
        *sessions.borrow_mut() = copied;
    });
}

/// Drop a session from the task-local map.
pub fn remove_current_session(project_name: &str) {
    let _ = ACTIVE_SESSIONS.try_with(|sessions| {
        let mut copied: HashMap<String, Arc<Session>> = sessions.borrow().clone();
        copied.remove(project_name);
        *sessions.borrow_mut() = copied;
    });
}

/// Resolve the project name for a request without an explicit name:
/// the configured default, then the basename of the agent-reported working
/// directory, then `"default"`.
fn resolve_project_name(state: &ServerState) -> String {
    if let Some(name) = state.default_project.lock().clone() {
        return name;
    }

    let from_cwd = state.manager.with_blackboard(|bb| {
        bb.client_context_info
            .as_ref()
            .and_then(|info| info.get("working_directory"))
            .and_then(|dir| dir.as_str())
            .and_then(|dir| Path::new(dir).file_name())
            .map(|name| name.to_string_lossy().to_string())
    });

    from_cwd
        .filter(|name| gp_config::validate_project_name(name).is_ok())
        .unwrap_or_else(|| "default".to_string())
}

/// Get or create the session for a project.
///
/// Looks up the task-local map first, then the process-wide map shared with
/// background tasks. On creation the template-context cache is registered
/// as a listener and all listeners are notified of the session change.
pub async fn get_or_create_session(
    state: &Arc<ServerState>,
    project_name: Option<&str>,
) -> Result<Arc<Session>, ConfigError> {
    let name = match project_name {
        Some(name) => name.to_string(),
        None => resolve_project_name(state),
    };

    if let Some(session) = current_session(Some(&name)) {
        return Ok(session);
    }
    if let Some(session) = state.sessions.lock().get(&name).cloned() {
        set_current_session(Arc::clone(&session));
        return Ok(session);
    }

    debug!(project = %name, "creating session");
    let session = Arc::new(Session::new(state.config.clone(), &name)?);
    session.add_listener(Arc::clone(&state.context_cache) as Arc<dyn gp_config::SessionListener>);

    state
        .sessions
        .lock()
        .insert(name.clone(), Arc::clone(&session));
    set_current_session(Arc::clone(&session));
    state.default_project.lock().get_or_insert(name);

    session.notify_session_changed();
    Ok(session)
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
