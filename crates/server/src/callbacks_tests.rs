// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use async_trait::async_trait;
use gp_config::ConfigManager;
use gp_core::{Handled, Task, TaskError};
use parking_lot::Mutex;
use tempfile::TempDir;

struct CapturingTask {
    seen: Mutex<Vec<EventData>>,
}

#[async_trait]
impl Task for CapturingTask {
    fn name(&self) -> &str {
        "capturing"
    }

    async fn handle_event(
        &self,
        _event_type: EventType,
        data: &EventData,
    ) -> Result<Handled, TaskError> {
        self.seen.lock().push(data.clone());
        Ok(Handled::Yes)
    }
}

struct Fixture {
    _dir: TempDir,
    state: Arc<ServerState>,
    task: Arc<CapturingTask>,
}

fn fixture() -> Fixture {
    let dir = TempDir::new().unwrap();
    let state = ServerState::new(ConfigManager::with_dir(dir.path()));
    let task = Arc::new(CapturingTask {
        seen: Mutex::new(Vec::new()),
    });
    state
        .manager
        .subscribe(
            Arc::clone(&task) as Arc<dyn Task>,
            EventType::FS_FILE_CONTENT
                | EventType::FS_DIRECTORY
                | EventType::FS_COMMAND
                | EventType::FS_CWD,
            None,
        )
        .unwrap();
    Fixture {
        _dir: dir,
        state,
        task,
    }
}

async fn run(fx: &Fixture, output: ToolOutput) -> ToolResult {
    fx.state
        .manager
        .process_result(output.result, output.event)
        .await
}

#[tokio::test]
async fn file_content_is_cached_and_dispatched() {
    let fx = fixture();

    let output = send_file_content(
        Arc::clone(&fx.state),
        SendFileContentArgs {
            path: "docs/intro.md".to_string(),
            content: "# Intro".to_string(),
            mtime: Some(100.0),
            encoding: Some("utf-8".to_string()),
        },
    )
    .await;
    let result = run(&fx, output).await;

    assert!(result.success);
    assert_eq!(
        fx.state.file_cache.get("docs/intro.md", None),
        Some("# Intro".to_string())
    );

    let seen = fx.task.seen.lock();
    assert_eq!(seen.len(), 1);
    match &seen[0] {
        EventData::FileContent { path, content, .. } => {
            assert_eq!(path, "docs/intro.md");
            assert_eq!(content, "# Intro");
        }
        other => panic!("unexpected event: {:?}", other),
    }
}

#[tokio::test]
async fn blacklisted_read_is_rejected_without_caching() {
    let fx = fixture();

    let output = send_file_content(
        Arc::clone(&fx.state),
        SendFileContentArgs {
            path: "/etc/passwd".to_string(),
            content: "root:x:0:0".to_string(),
            mtime: None,
            encoding: None,
        },
    )
    .await;

    assert!(!output.result.success);
    assert_eq!(output.result.error_type, Some(ErrorKind::Security));
    assert!(output.event.is_none(), "no event for rejected paths");
    assert!(fx.state.file_cache.is_empty());
    assert_eq!(fx.state.security_violation_count(), 1);
    assert!(fx.task.seen.lock().is_empty());
}

#[tokio::test]
async fn traversal_read_is_rejected() {
    let fx = fixture();

    let output = send_file_content(
        Arc::clone(&fx.state),
        SendFileContentArgs {
            path: "../outside.txt".to_string(),
            content: "data".to_string(),
            mtime: None,
            encoding: None,
        },
    )
    .await;

    assert_eq!(output.result.error_type, Some(ErrorKind::Security));
    assert_eq!(fx.state.security_violation_count(), 1);
}

#[tokio::test]
async fn directory_listing_dispatches_entries() {
    let fx = fixture();

    let output = send_directory_listing(
        Arc::clone(&fx.state),
        SendDirectoryListingArgs {
            path: "openspec/changes".to_string(),
            files: vec![ListingEntry {
                name: "add-auth".to_string(),
                kind: "directory".to_string(),
                size: None,
            }],
            pattern: None,
            recursive: false,
        },
    )
    .await;
    let result = run(&fx, output).await;

    assert!(result.success);
    let seen = fx.task.seen.lock();
    assert!(matches!(&seen[0], EventData::Directory { path, files }
        if path == "openspec/changes" && files.len() == 1));
}

#[tokio::test]
async fn command_location_dispatches() {
    let fx = fixture();

    let output = send_command_location(
        Arc::clone(&fx.state),
        SendCommandLocationArgs {
            command: "openspec".to_string(),
            path: Some("/usr/local/bin/openspec".to_string()),
            found: true,
        },
    )
    .await;
    run(&fx, output).await;

    let seen = fx.task.seen.lock();
    assert!(matches!(&seen[0], EventData::Command { command, found: true, .. }
        if command == "openspec"));
}

#[tokio::test]
async fn working_directory_dispatches() {
    let fx = fixture();

    let output = send_working_directory(
        Arc::clone(&fx.state),
        SendWorkingDirectoryArgs {
            working_directory: "/work/repo".to_string(),
        },
    )
    .await;
    let result = run(&fx, output).await;

    assert!(result.success);
    let seen = fx.task.seen.lock();
    assert!(matches!(&seen[0], EventData::Cwd { working_directory }
        if working_directory == "/work/repo"));
}

#[tokio::test]
async fn found_files_is_informational() {
    let fx = fixture();

    let output = send_found_files(
        Arc::clone(&fx.state),
        SendFoundFilesArgs {
            pattern: "*.md".to_string(),
            files: vec!["a.md".to_string(), "b.md".to_string()],
            start_path: None,
        },
    )
    .await;

    assert!(output.event.is_none());
    let result = run(&fx, output).await;
    assert!(result.success);
    assert!(fx.task.seen.lock().is_empty());
}
