// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Feature-flag proxies and resolution.
//!
//! Flag queries resolve project overrides first, then global values. Known
//! flags: `openspec`, `workflow`, `workflow-file`, `workflow-consent`,
//! `content-style`.

use crate::error::ConfigError;
use crate::model::FlagValue;
use crate::session::Session;
use crate::store::ConfigManager;
use crate::validate::validate_flag_name;
use indexmap::IndexMap;

pub const FLAG_OPENSPEC: &str = "openspec";
pub const FLAG_WORKFLOW: &str = "workflow";
pub const FLAG_WORKFLOW_FILE: &str = "workflow-file";
pub const FLAG_WORKFLOW_CONSENT: &str = "workflow-consent";
pub const FLAG_CONTENT_STYLE: &str = "content-style";

/// Proxy over the global flag store.
pub struct GlobalFlags<'a> {
    config: &'a ConfigManager,
}

impl<'a> GlobalFlags<'a> {
    pub fn new(config: &'a ConfigManager) -> Self {
        Self { config }
    }

    pub async fn get(&self, name: &str) -> Result<Option<FlagValue>, ConfigError> {
        Ok(self.config.global_flags().await?.get(name).cloned())
    }

    pub async fn set(&self, name: &str, value: FlagValue) -> Result<(), ConfigError> {
        validate_flag_name(name)?;
        self.config.set_global_flag(name, value).await
    }

    pub async fn remove(&self, name: &str) -> Result<bool, ConfigError> {
        self.config.remove_global_flag(name).await
    }

    pub async fn list(&self) -> Result<IndexMap<String, FlagValue>, ConfigError> {
        self.config.global_flags().await
    }
}

/// Proxy over the current project's flag overrides.
pub struct ProjectFlags<'a> {
    session: &'a Session,
}

impl<'a> ProjectFlags<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    pub async fn get(&self, name: &str) -> Result<Option<FlagValue>, ConfigError> {
        Ok(self.session.project().await?.project_flags.get(name).cloned())
    }

    pub async fn set(&self, name: &str, value: FlagValue) -> Result<(), ConfigError> {
        validate_flag_name(name)?;
        let name = name.to_string();
        self.session
            .update_config(move |mut project| {
                project.project_flags.insert(name, value);
                project
            })
            .await
    }

    pub async fn remove(&self, name: &str) -> Result<bool, ConfigError> {
        let existed = self.get(name).await?.is_some();
        if existed {
            let name = name.to_string();
            self.session
                .update_config(move |mut project| {
                    project.project_flags.shift_remove(&name);
                    project
                })
                .await?;
        }
        Ok(existed)
    }

    pub async fn list(&self) -> Result<IndexMap<String, FlagValue>, ConfigError> {
        Ok(self.session.project().await?.project_flags.clone())
    }
}

impl Session {
    /// Global flag proxy.
    pub fn feature_flags(&self) -> GlobalFlags<'_> {
        GlobalFlags::new(self.config())
    }

    /// Project flag proxy.
    pub fn project_flags(&self) -> ProjectFlags<'_> {
        ProjectFlags::new(self)
    }
}

/// Resolve one flag: project override, then global, then none.
pub async fn resolve_flag(session: &Session, name: &str) -> Result<Option<FlagValue>, ConfigError> {
    if let Some(value) = session.project_flags().get(name).await? {
        return Ok(Some(value));
    }
    session.feature_flags().get(name).await
}

/// Resolve all flags: the global map overlaid with project overrides.
pub async fn resolve_all_flags(
    session: &Session,
) -> Result<IndexMap<String, FlagValue>, ConfigError> {
    let mut resolved = session.feature_flags().list().await?;
    for (name, value) in session.project().await?.project_flags.iter() {
        resolved.insert(name.clone(), value.clone());
    }
    Ok(resolved)
}

#[cfg(test)]
#[path = "flags_tests.rs"]
mod tests;
