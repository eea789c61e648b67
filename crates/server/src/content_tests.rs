// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use gp_config::{Category, Collection, ConfigManager};
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    state: Arc<ServerState>,
}

async fn fixture() -> Fixture {
    let dir = TempDir::new().unwrap();
    let docs = dir.path().join("docs");
    std::fs::create_dir_all(docs.join("guides")).unwrap();
    std::fs::create_dir_all(docs.join("specs")).unwrap();
    std::fs::write(docs.join("guides/intro.md"), "Welcome.").unwrap();
    std::fs::write(docs.join("guides/setup.md"), "Install steps.").unwrap();
    std::fs::write(docs.join("specs/api.md"), "API spec.").unwrap();
    std::fs::write(
        docs.join("guides/templated.md.hbs"),
        "Project {{project.name}}.",
    )
    .unwrap();

    let state = ServerState::new(ConfigManager::with_dir(dir.path()));
    let session = crate::session::get_or_create_session(&state, Some("demo"))
        .await
        .unwrap();
    session
        .update_config(|mut project| {
            project.categories.insert(
                "guides".to_string(),
                Category {
                    dir: "guides".to_string(),
                    patterns: vec!["*".to_string()],
                    description: String::new(),
                },
            );
            project.categories.insert(
                "specs".to_string(),
                Category {
                    dir: "specs".to_string(),
                    patterns: vec!["*".to_string()],
                    description: String::new(),
                },
            );
            project.collections.insert(
                "all".to_string(),
                Collection {
                    categories: vec!["guides".to_string(), "specs".to_string()],
                    description: String::new(),
                },
            );
            project.collections.insert(
                "everything".to_string(),
                Collection {
                    categories: vec!["all".to_string()],
                    description: String::new(),
                },
            );
            project
        })
        .await
        .unwrap();

    Fixture { _dir: dir, state }
}

#[tokio::test]
async fn resolves_category_content() {
    let fx = fixture().await;
    let result = get_content(&fx.state, "guides").await;

    assert!(result.success, "error: {:?}", result.error);
    let value = result.value.unwrap();
    let text = value.as_str().unwrap();
    assert!(text.contains("# intro.md"));
    assert!(text.contains("Welcome."));
    assert!(text.contains("Install steps."));
    assert!(!text.contains("API spec."));
}

#[tokio::test]
async fn templates_render_against_context() {
    let fx = fixture().await;
    let result = get_content(&fx.state, "guides").await;

    let value = result.value.unwrap();
    assert!(value.as_str().unwrap().contains("Project demo."));
}

#[tokio::test]
async fn collection_expands_to_categories() {
    let fx = fixture().await;
    let result = get_content(&fx.state, "all").await;

    let value = result.value.unwrap();
    let text = value.as_str().unwrap();
    assert!(text.contains("Welcome."));
    assert!(text.contains("API spec."));
}

#[tokio::test]
async fn nested_collection_terminates() {
    let fx = fixture().await;
    let result = get_content(&fx.state, "everything").await;
    assert!(result.success);
    assert!(result.value.unwrap().as_str().unwrap().contains("API spec."));
}

#[tokio::test]
async fn duplicate_names_dedupe_files() {
    let fx = fixture().await;
    let result = get_content(&fx.state, "guides, all").await;

    let value = result.value.unwrap();
    let text = value.as_str().unwrap();
    assert_eq!(text.matches("Welcome.").count(), 1);
}

#[tokio::test]
async fn unknown_name_is_not_found() {
    let fx = fixture().await;
    let result = get_content(&fx.state, "missing").await;

    assert!(!result.success);
    assert_eq!(result.error_type, Some(gp_core::ErrorKind::NotFound));
    assert!(result.instruction.is_some());
}

#[tokio::test]
async fn empty_expression_is_validation_error() {
    let fx = fixture().await;
    let result = get_content(&fx.state, " , ,").await;
    assert_eq!(
        result.error_type,
        Some(gp_core::ErrorKind::ValidationError)
    );
}

#[tokio::test]
async fn collection_cycles_terminate() {
    let fx = fixture().await;
    let session = crate::session::get_or_create_session(&fx.state, Some("demo"))
        .await
        .unwrap();
    // Two collections referencing each other
    session
        .update_config(|mut project| {
            project.collections.insert(
                "a".to_string(),
                Collection {
                    categories: vec!["b".to_string(), "guides".to_string()],
                    description: String::new(),
                },
            );
            project.collections.insert(
                "b".to_string(),
                Collection {
                    categories: vec!["a".to_string()],
                    description: String::new(),
                },
            );
            project
        })
        .await
        .unwrap();

    let result = get_content(&fx.state, "a").await;
    assert!(result.success);
    assert!(result.value.unwrap().as_str().unwrap().contains("Welcome."));
}
