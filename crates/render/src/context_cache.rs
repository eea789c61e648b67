// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Layered template-context cache.
//!
//! The composed system ⊳ client ⊳ agent ⊳ project chain is memoised at the
//! cache instance; category, collection, and transient contexts are rebuilt
//! per query. Session and config changes invalidate the memo through the
//! `SessionListener` registration performed at session creation.

use crate::context::ContextChain;
use chrono::{Local, Utc};
use gp_config::{
    parse_workflow_phases, resolve_all_flags, substitute_variables, FlagValue, Session,
    SessionListener, DEFAULT_WORKFLOW_FILE,
};
use gp_core::group_changes;
use gp_engine::TaskManager;
use parking_lot::Mutex;
use serde_json::{json, Map, Value};
use tracing::{debug, trace};

pub struct TemplateContextCache {
    tool_prefix: String,
    memo: Mutex<Option<ContextChain>>,
}

impl SessionListener for TemplateContextCache {
    fn on_session_changed(&self, project_name: &str) {
        self.invalidate();
        debug!(project = project_name, "context cache invalidated by session change");
    }

    fn on_config_changed(&self, project_name: &str) {
        self.invalidate();
        debug!(project = project_name, "context cache invalidated by config change");
    }
}

impl TemplateContextCache {
    pub fn new(tool_prefix: impl Into<String>) -> Self {
        Self {
            tool_prefix: tool_prefix.into(),
            memo: Mutex::new(None),
        }
    }

    pub fn invalidate(&self) {
        *self.memo.lock() = None;
    }

    /// Layered contexts for rendering. Category and collection layers are
    /// never cached; the base chain is.
    pub async fn template_contexts(
        &self,
        session: &Session,
        manager: &TaskManager,
        category: Option<&str>,
        collection: Option<&str>,
    ) -> ContextChain {
        let cached = { self.memo.lock().clone() };
        let base = match cached {
            Some(cached) if category.is_none() && collection.is_none() => {
                trace!("returning cached template context");
                return cached;
            }
            Some(cached) => cached,
            None => {
                trace!("building template context");
                let built = self.build_base(session, manager).await;
                *self.memo.lock() = Some(built.clone());
                built
            }
        };

        let mut chain = base;
        if let Some(name) = category {
            chain = Self::build_category_context(session, name)
                .await
                .new_child(&chain);
        }
        if let Some(name) = collection {
            chain = Self::build_collection_context(session, name)
                .await
                .new_child(&chain);
        }
        chain
    }

    async fn build_base(&self, session: &Session, manager: &TaskManager) -> ContextChain {
        let system = Self::build_system_context();
        let client = Self::build_client_context(manager).new_child(&system);
        let agent = self
            .build_agent_context(session, manager)
            .await
            .new_child(&client);
        Self::build_project_context(session, manager)
            .await
            .new_child(&agent)
    }

    fn build_system_context() -> ContextChain {
        ContextChain::new(json!({
            "server": {
                "os": std::env::consts::OS,
                "platform": format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH),
                "version": env!("CARGO_PKG_VERSION"),
            }
        }))
    }

    fn build_client_context(manager: &TaskManager) -> ContextChain {
        let (os_info, context_info) = manager.with_blackboard(|bb| {
            (
                bb.client_os_info.clone(),
                bb.client_context_info.clone(),
            )
        });

        let mut vars = Map::new();
        vars.insert("client".to_string(), os_info.unwrap_or_else(|| json!({})));
        if let Some(Value::Object(context)) = context_info {
            for key in ["user", "repo", "working_directory"] {
                if let Some(value) = context.get(key) {
                    vars.insert(key.to_string(), value.clone());
                }
            }
        }
        ContextChain::new(Value::Object(vars))
    }

    async fn build_agent_context(&self, session: &Session, manager: &TaskManager) -> ContextChain {
        let mut vars = Map::new();
        vars.insert("@".to_string(), json!("@"));
        vars.insert("tool_prefix".to_string(), json!(self.tool_prefix));

        vars.insert(
            "tasks".to_string(),
            serde_json::to_value(manager.get_task_statistics()).unwrap_or(Value::Null),
        );

        let openspec = manager.with_blackboard(|bb| {
            bb.openspec_available.map(|available| {
                let changes = bb
                    .openspec_changes
                    .as_deref()
                    .map(|entries| group_changes(entries, manager.clock().epoch()));
                json!({
                    "available": available,
                    "version": bb.openspec_version,
                    "changes": changes,
                })
            })
        });
        vars.insert(
            "openspec".to_string(),
            openspec.unwrap_or(Value::Bool(false)),
        );

        // Formatting variables follow the content-style flag
        let style = resolve_all_flags(session)
            .await
            .ok()
            .and_then(|flags| {
                flags
                    .get(gp_config::flags::FLAG_CONTENT_STYLE)
                    .and_then(|v| v.as_str().map(String::from))
            })
            .unwrap_or_else(|| "plain".to_string());
        vars.insert("content_style".to_string(), json!(style));
        vars.insert("style_plain".to_string(), json!(style == "plain"));
        vars.insert("style_markdown".to_string(), json!(style == "markdown"));

        ContextChain::new(Value::Object(vars))
    }

    async fn build_project_context(session: &Session, manager: &TaskManager) -> ContextChain {
        let mut vars = Map::new();

        let project = session.project().await.ok();

        if let Some(project) = &project {
            let categories: Vec<Value> = project
                .categories
                .iter()
                .map(|(name, category)| {
                    json!({
                        "name": name,
                        "dir": category.dir,
                        "patterns": category.patterns,
                        "patterns_str": backtick_join(&category.patterns),
                        "description": category.description,
                    })
                })
                .collect();
            let collections: Vec<Value> = project
                .collections
                .iter()
                .map(|(name, collection)| {
                    json!({
                        "name": name,
                        "description": collection.description,
                        "categories": collection.categories,
                        "categories_str": backtick_join(&collection.categories),
                    })
                })
                .collect();
            let flag_values: Vec<Value> = project
                .project_flags
                .iter()
                .map(|(key, value)| json!({"key": key, "value": flag_to_value(value)}))
                .collect();

            vars.insert(
                "project".to_string(),
                json!({
                    "name": project.name,
                    "key": project.key,
                    "hash": project.hash,
                    "categories": categories,
                    "collections": collections,
                    "project_flag_values": flag_values,
                }),
            );
        }

        vars.insert(
            "client_working_dir".to_string(),
            json!(session.current_dir().unwrap_or_default()),
        );

        if let Ok(global_flags) = session.feature_flags().list().await {
            let as_map: Map<String, Value> = global_flags
                .iter()
                .map(|(k, v)| (k.clone(), flag_to_value(v)))
                .collect();
            let as_list: Vec<Value> = global_flags
                .iter()
                .map(|(k, v)| json!({"key": k, "value": flag_to_value(v)}))
                .collect();
            vars.insert("feature_flags".to_string(), Value::Object(as_map));
            vars.insert("feature_flag_values".to_string(), Value::Array(as_list));
        }

        if let Ok(all) = session.config().all_projects().await {
            let current = project.as_ref().map(|p| p.name.clone()).unwrap_or_default();
            let listed: Vec<Value> = all
                .iter()
                .map(|(key, p)| {
                    json!({
                        "key": key,
                        "value": {
                            "name": p.name,
                            "categories": p.categories.iter().map(|(name, c)| json!({
                                "name": name,
                                "dir": c.dir,
                                "patterns_str": backtick_join(&c.patterns),
                            })).collect::<Vec<_>>(),
                            "collections": p.collections.iter().map(|(name, c)| json!({
                                "name": name,
                                "categories_str": backtick_join(&c.categories),
                            })).collect::<Vec<_>>(),
                        },
                        "current": *key == current,
                    })
                })
                .collect();
            vars.insert("projects_count".to_string(), json!(listed.len()));
            vars.insert("projects".to_string(), json!({ "projects": listed }));
        }

        let base = ContextChain::new(Value::Object(vars));
        match Self::build_workflow_context(session, manager, project.as_deref()).await {
            Some(workflow) => ContextChain::new(json!({ "workflow": workflow })).new_child(&base),
            None => base,
        }
    }

    /// Workflow sub-context, present only when the workflow flag is enabled.
    async fn build_workflow_context(
        session: &Session,
        manager: &TaskManager,
        project: Option<&gp_config::Project>,
    ) -> Option<Value> {
        let project = project?;
        let flags = resolve_all_flags(session).await.ok()?;
        let parsed = parse_workflow_phases(flags.get(gp_config::flags::FLAG_WORKFLOW)?);
        if !parsed.enabled {
            return None;
        }

        let mut workflow = Map::new();
        workflow.insert("phases".to_string(), json!(parsed.phases));

        let file = match flags
            .get(gp_config::flags::FLAG_WORKFLOW_FILE)
            .and_then(|v| v.as_str())
        {
            Some(template) => {
                substitute_variables(template, &project.name, &project.key, &project.hash)
            }
            None => DEFAULT_WORKFLOW_FILE.to_string(),
        };
        workflow.insert("file".to_string(), json!(file));

        // Consent configuration: phase name -> comma-separated entry/exit
        let consent_flag = flags.get(gp_config::flags::FLAG_WORKFLOW_CONSENT);
        let mut consent = Map::new();
        for phase in &parsed.phases {
            let raw = consent_flag
                .and_then(|v| v.as_map())
                .and_then(|m| m.get(phase))
                .map(String::as_str)
                .unwrap_or_default();
            let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
            consent.insert(
                phase.clone(),
                json!({
                    "entry": parts.contains(&"entry"),
                    "exit": parts.contains(&"exit"),
                }),
            );
        }

        for phase in &parsed.phases {
            workflow.insert(phase.clone(), Value::Bool(true));
        }

        let state = manager.with_blackboard(|bb| bb.workflow_state.clone());
        if let Some(state) = state {
            workflow.insert("phase".to_string(), json!(state.phase));
            workflow.insert("issue".to_string(), json!(state.issue));
            workflow.insert("tracking".to_string(), json!(state.tracking));
            workflow.insert("description".to_string(), json!(state.description));
            workflow.insert("queue".to_string(), json!(state.queue));

            let next = state
                .phase
                .as_deref()
                .and_then(|current| {
                    parsed
                        .phases
                        .iter()
                        .position(|p| p == current)
                        .map(|i| parsed.phases[(i + 1) % parsed.phases.len()].clone())
                })
                .or_else(|| parsed.phases.first().cloned());
            workflow.insert("next".to_string(), json!(next));

            if let Some(phase) = state.phase.as_deref() {
                if let Some(current_consent) = consent.get(phase).cloned() {
                    consent.insert("entry".to_string(), current_consent["entry"].clone());
                    consent.insert("exit".to_string(), current_consent["exit"].clone());
                }
            }
        }
        workflow.insert("consent".to_string(), Value::Object(consent));

        Some(Value::Object(workflow))
    }

    async fn build_category_context(session: &Session, name: &str) -> ContextChain {
        let mut data = json!({"name": "", "dir": "", "patterns": [], "description": ""});
        if let Ok(project) = session.project().await {
            if let Some(category) = project.categories.get(name) {
                data = json!({
                    "name": name,
                    "dir": category.dir,
                    "patterns": category.patterns,
                    "patterns_str": backtick_join(&category.patterns),
                    "description": category.description,
                });
            }
        }
        ContextChain::new(json!({ "category": data }))
    }

    async fn build_collection_context(session: &Session, name: &str) -> ContextChain {
        let mut data = json!({"name": "", "categories": [], "description": ""});
        if let Ok(project) = session.project().await {
            if let Some(collection) = project.collections.get(name) {
                data = json!({
                    "name": name,
                    "categories": collection.categories,
                    "categories_str": backtick_join(&collection.categories),
                    "description": collection.description,
                });
            }
        }
        ContextChain::new(json!({ "collection": data }))
    }

    /// Fresh timestamps; never cached.
    pub fn transient_context() -> ContextChain {
        let now_local = Local::now();
        let now_utc = Utc::now();
        let timestamp_ns = now_utc
            .timestamp_nanos_opt()
            .unwrap_or_else(|| now_utc.timestamp() * 1_000_000_000);

        ContextChain::new(json!({
            "timestamp": timestamp_ns as f64 / 1e9,
            "timestamp_ms": timestamp_ns as f64 / 1e6,
            "timestamp_ns": timestamp_ns,
            "now": {
                "date": now_local.format("%Y-%m-%d").to_string(),
                "day": now_local.format("%A").to_string(),
                "time": now_local.format("%H:%M").to_string(),
                "tz": now_local.format("%z").to_string(),
                "datetime": now_local.format("%Y-%m-%d %H:%M:%S%z").to_string(),
            },
            "now_utc": {
                "date": now_utc.format("%Y-%m-%d").to_string(),
                "day": now_utc.format("%A").to_string(),
                "time": now_utc.format("%H:%M").to_string(),
                "tz": "+0000",
                "datetime": now_utc.format("%Y-%m-%d %H:%M:%SZ").to_string(),
            },
        }))
    }
}

fn backtick_join(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("`{}`", item))
        .collect::<Vec<_>>()
        .join(", ")
}

fn flag_to_value(flag: &FlagValue) -> Value {
    serde_json::to_value(flag).unwrap_or(Value::Null)
}

#[cfg(test)]
#[path = "context_cache_tests.rs"]
mod tests;
