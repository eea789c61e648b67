// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::model::{Category, Collection};
use tempfile::TempDir;

fn manager() -> (TempDir, ConfigManager) {
    let dir = TempDir::new().unwrap();
    let manager = ConfigManager::with_dir(dir.path());
    (dir, manager)
}

#[tokio::test]
async fn missing_file_loads_empty_store() {
    let (_dir, manager) = manager();
    let store = manager.load_store().await.unwrap();
    assert!(store.projects.is_empty());
    assert!(store.flags.is_empty());
}

#[tokio::test]
async fn get_or_create_persists_new_project() {
    let (_dir, manager) = manager();

    let project = manager.get_or_create_project("demo").await.unwrap();
    assert_eq!(project.name, "demo");

    // A fresh manager over the same directory sees the project
    let reloaded = ConfigManager::with_dir(manager.config_dir())
        .all_projects()
        .await
        .unwrap();
    assert!(reloaded.contains_key("demo"));
}

#[tokio::test]
async fn get_or_create_is_idempotent() {
    let (_dir, manager) = manager();
    let first = manager.get_or_create_project("demo").await.unwrap();
    let second = manager.get_or_create_project("demo").await.unwrap();
    assert_eq!(first, second);
    assert_eq!(manager.list_projects().await.unwrap().len(), 1);
}

#[tokio::test]
async fn project_round_trips_with_order_preserved() {
    let (_dir, manager) = manager();

    let mut project = Project::new("demo").unwrap();
    for name in ["zebra", "alpha", "mango"] {
        project.categories.insert(
            name.to_string(),
            Category {
                dir: name.to_string(),
                patterns: vec!["*.md".to_string(), "guides/*.md".to_string()],
                description: format!("{} docs", name),
            },
        );
    }
    project.collections.insert(
        "all".to_string(),
        Collection {
            categories: vec!["zebra".to_string(), "alpha".to_string()],
            description: String::new(),
        },
    );
    project
        .project_flags
        .insert("workflow".to_string(), FlagValue::Bool(true));
    project.openspec_version = Some("1.2.3".to_string());

    manager.save_project(&project).await.unwrap();

    let reloaded = manager.all_projects().await.unwrap();
    let loaded = reloaded.get("demo").unwrap();
    assert_eq!(loaded, &project);
    let order: Vec<&String> = loaded.categories.keys().collect();
    assert_eq!(order, ["zebra", "alpha", "mango"]);
}

#[tokio::test]
async fn save_replaces_existing_project() {
    let (_dir, manager) = manager();
    let mut project = manager.get_or_create_project("demo").await.unwrap();

    project.categories.insert(
        "docs".to_string(),
        Category {
            dir: "docs".to_string(),
            patterns: vec![],
            description: String::new(),
        },
    );
    manager.save_project(&project).await.unwrap();

    let reloaded = manager.all_projects().await.unwrap();
    assert!(reloaded.get("demo").unwrap().categories.contains_key("docs"));
}

#[tokio::test]
async fn concurrent_saves_do_not_lose_projects() {
    let (_dir, manager) = manager();

    let mut handles = Vec::new();
    for i in 0..8 {
        let manager = manager.clone();
        handles.push(tokio::spawn(async move {
            manager
                .get_or_create_project(&format!("project-{}", i))
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(manager.list_projects().await.unwrap().len(), 8);
}

#[tokio::test]
async fn global_flags_round_trip() {
    let (_dir, manager) = manager();

    manager
        .set_global_flag("openspec", FlagValue::Bool(true))
        .await
        .unwrap();
    manager
        .set_global_flag("content-style", FlagValue::Str("markdown".to_string()))
        .await
        .unwrap();

    let flags = manager.global_flags().await.unwrap();
    assert_eq!(flags.get("openspec"), Some(&FlagValue::Bool(true)));

    assert!(manager.remove_global_flag("openspec").await.unwrap());
    assert!(!manager.remove_global_flag("openspec").await.unwrap());
    assert_eq!(manager.global_flags().await.unwrap().len(), 1);
}

#[test]
fn docroot_is_under_config_dir() {
    let manager = ConfigManager::with_dir("/tmp/guidepost-test");
    assert!(manager.docroot().ends_with("docs"));
}
