// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration store with atomic, locked persistence.
//!
//! The whole store lives in one TOML file under the product config
//! directory. Writers take an exclusive advisory lock for the full
//! read-modify-write cycle and replace the file via temp-file-then-rename;
//! readers get a point-in-time snapshot without locking.

use crate::error::ConfigError;
use crate::model::{FlagValue, Project};
use fs2::FileExt;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

const PRODUCT_DIR: &str = "guidepost";
const CONFIG_FILE: &str = "config.toml";
const LOCK_FILE: &str = "config.lock";
const DOCROOT_DIR: &str = "docs";

/// On-disk shape of the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigStore {
    /// Global feature flags
    #[serde(default)]
    pub flags: IndexMap<String, FlagValue>,
    /// Projects keyed by project key
    #[serde(default)]
    pub projects: IndexMap<String, Project>,
}

/// Handle on the configuration directory.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: PathBuf,
}

impl ConfigManager {
    /// Resolve the product config directory (`XDG_CONFIG_HOME` aware).
    pub fn new() -> Result<Self, ConfigError> {
        let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(Self {
            config_dir: base.join(PRODUCT_DIR),
        })
    }

    /// Use an explicit directory (tests, overrides).
    pub fn with_dir(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    /// Document root holding installed templates.
    pub fn docroot(&self) -> PathBuf {
        self.config_dir.join(DOCROOT_DIR)
    }

    /// Point-in-time snapshot of the whole store. Does not lock.
    pub async fn load_store(&self) -> Result<ConfigStore, ConfigError> {
        let path = self.config_path();
        match tokio::fs::read_to_string(&path).await {
            Ok(raw) => Ok(toml::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigStore::default()),
            Err(e) => Err(ConfigError::Read(e)),
        }
    }

    /// Run a mutation under the store lock and persist the result.
    pub async fn modify_store<T, F>(&self, mutate: F) -> Result<T, ConfigError>
    where
        T: Send + 'static,
        F: FnOnce(&mut ConfigStore) -> Result<T, ConfigError> + Send + 'static,
    {
        let dir = self.config_dir.clone();
        tokio::task::spawn_blocking(move || locked_modify(&dir, mutate))
            .await
            .map_err(|e| ConfigError::Write(std::io::Error::other(e)))?
    }

    /// Load a project, creating and persisting an empty one when absent.
    pub async fn get_or_create_project(&self, name: &str) -> Result<Project, ConfigError> {
        let name = name.to_string();
        self.modify_store(move |store| {
            if let Some(project) = store.projects.get(&name) {
                return Ok(project.clone());
            }
            let project = Project::new(&name)?;
            debug!(project = %name, "created project config");
            store.projects.insert(name, project.clone());
            Ok(project)
        })
        .await
    }

    /// Persist one project, replacing any existing entry with the same key.
    pub async fn save_project(&self, project: &Project) -> Result<(), ConfigError> {
        let project = project.clone();
        self.modify_store(move |store| {
            store.projects.insert(project.key.clone(), project);
            Ok(())
        })
        .await
    }

    pub async fn all_projects(&self) -> Result<IndexMap<String, Project>, ConfigError> {
        Ok(self.load_store().await?.projects)
    }

    pub async fn list_projects(&self) -> Result<Vec<String>, ConfigError> {
        Ok(self.load_store().await?.projects.keys().cloned().collect())
    }

    pub async fn global_flags(&self) -> Result<IndexMap<String, FlagValue>, ConfigError> {
        Ok(self.load_store().await?.flags)
    }

    pub async fn set_global_flag(
        &self,
        name: &str,
        value: FlagValue,
    ) -> Result<(), ConfigError> {
        let name = name.to_string();
        self.modify_store(move |store| {
            store.flags.insert(name, value);
            Ok(())
        })
        .await
    }

    pub async fn remove_global_flag(&self, name: &str) -> Result<bool, ConfigError> {
        let name = name.to_string();
        self.modify_store(move |store| Ok(store.flags.shift_remove(&name).is_some()))
            .await
    }
}

fn locked_modify<T>(
    dir: &Path,
    mutate: impl FnOnce(&mut ConfigStore) -> Result<T, ConfigError>,
) -> Result<T, ConfigError> {
    std::fs::create_dir_all(dir).map_err(ConfigError::Write)?;

    let lock_file = std::fs::OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(dir.join(LOCK_FILE))
        .map_err(ConfigError::Write)?;
    lock_file.lock_exclusive().map_err(ConfigError::Write)?;

    let result = (|| {
        let mut store = read_store_sync(dir)?;
        let value = mutate(&mut store)?;
        write_store_sync(dir, &store)?;
        Ok(value)
    })();

    let _ = FileExt::unlock(&lock_file);
    result
}

fn read_store_sync(dir: &Path) -> Result<ConfigStore, ConfigError> {
    match std::fs::read_to_string(dir.join(CONFIG_FILE)) {
        Ok(raw) => Ok(toml::from_str(&raw)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigStore::default()),
        Err(e) => Err(ConfigError::Read(e)),
    }
}

fn write_store_sync(dir: &Path, store: &ConfigStore) -> Result<(), ConfigError> {
    let serialised = toml::to_string_pretty(store)?;
    let tmp_path = dir.join(format!("{}.tmp", CONFIG_FILE));
    std::fs::write(&tmp_path, serialised).map_err(ConfigError::Write)?;
    std::fs::rename(&tmp_path, dir.join(CONFIG_FILE)).map_err(ConfigError::Write)?;
    Ok(())
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
