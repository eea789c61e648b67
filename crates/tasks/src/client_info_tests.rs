// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use gp_config::{ConfigManager, Session, StaticSessionProvider};
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    manager: Arc<TaskManager>,
    session: Arc<Session>,
}

async fn fixture() -> Fixture {
    let dir = TempDir::new().unwrap();
    let template = dir.path().join("docs/client");
    std::fs::create_dir_all(&template).unwrap();
    std::fs::write(
        template.join("client-context-check.md"),
        "Report your working directory with send_working_directory.",
    )
    .unwrap();

    let manager = Arc::new(TaskManager::new());
    let session =
        Arc::new(Session::new(ConfigManager::with_dir(dir.path()), "demo").unwrap());
    let provider = Arc::new(StaticSessionProvider(Arc::clone(&session)));
    let cache = Arc::new(TemplateContextCache::new("guide_"));
    let task = ClientInfoTask::new(Arc::clone(&manager), provider, cache);
    task.register().unwrap();

    Fixture {
        _dir: dir,
        manager,
        session,
    }
}

#[tokio::test]
async fn on_tool_requests_context_once() {
    let fx = fixture().await;

    fx.manager.clone().on_tool().await;
    assert_eq!(fx.manager.pending_instruction_count(), 1);

    fx.manager.clone().on_tool().await;
    assert_eq!(fx.manager.pending_instruction_count(), 1);
}

#[tokio::test]
async fn cwd_report_caches_client_facts() {
    let fx = fixture().await;

    let outcome = fx
        .manager
        .dispatch_event(
            EventType::FS_CWD,
            &EventData::Cwd {
                working_directory: "/work/repo".to_string(),
            },
        )
        .await;

    assert!(outcome.processed);
    assert_eq!(fx.session.current_dir(), Some("/work/repo".to_string()));

    let os_info = fx
        .manager
        .with_blackboard(|bb| bb.client_os_info.clone())
        .unwrap();
    assert_eq!(os_info["family"], "posix");

    let context = fx
        .manager
        .with_blackboard(|bb| bb.client_context_info.clone())
        .unwrap();
    assert_eq!(context["working_directory"], "/work/repo");
}

#[tokio::test]
async fn windows_paths_are_detected() {
    let fx = fixture().await;
    fx.manager
        .dispatch_event(
            EventType::FS_CWD,
            &EventData::Cwd {
                working_directory: "C:\\Users\\alice\\repo".to_string(),
            },
        )
        .await;

    let os_info = fx
        .manager
        .with_blackboard(|bb| bb.client_os_info.clone())
        .unwrap();
    assert_eq!(os_info["family"], "windows");
}

#[tokio::test]
async fn non_cwd_events_are_ignored() {
    let fx = fixture().await;
    let outcome = fx
        .manager
        .dispatch_event(
            EventType::FS_CWD,
            &EventData::Command {
                command: "git".to_string(),
                path: None,
                found: false,
            },
        )
        .await;
    assert!(!outcome.processed);
}
