// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Callback tools the agent invokes to deliver filesystem observations.
//!
//! Each callback validates the reported path against the read policy,
//! caches file bytes, synthesises the typed event, and lets the pipeline
//! post-hook dispatch it to subscribed tasks.

use crate::pipeline::{ToolOutput, ToolRegistry};
use crate::session::get_or_create_session;
use crate::state::ServerState;
use gp_core::{DirEntry, EntryKind, ErrorKind, EventData, EventType, ToolResult};
use gp_fsbridge::ReadWriteSecurityPolicy;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SendFileContentArgs {
    /// File path that was requested
    pub path: String,
    /// File content from the agent's filesystem
    pub content: String,
    /// File modification time, seconds since the epoch
    #[serde(default)]
    pub mtime: Option<f64>,
    /// File encoding
    #[serde(default)]
    pub encoding: Option<String>,
}

/// One reported directory entry; `type` is `"file"` or `"directory"`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListingEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub size: Option<u64>,
}

impl ListingEntry {
    fn into_dir_entry(self) -> DirEntry {
        DirEntry {
            name: self.name,
            kind: if self.kind == "directory" {
                EntryKind::Directory
            } else {
                EntryKind::File
            },
            size: self.size,
        }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SendDirectoryListingArgs {
    /// Directory path that was listed
    pub path: String,
    /// Entries found in the directory
    pub files: Vec<ListingEntry>,
    /// Glob filter that was applied, if any
    #[serde(default)]
    pub pattern: Option<String>,
    /// Whether the listing was recursive
    #[serde(default)]
    pub recursive: bool,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SendCommandLocationArgs {
    /// Command that was searched for
    pub command: String,
    /// Full path when found
    #[serde(default)]
    pub path: Option<String>,
    /// Whether the command was found
    #[serde(default)]
    pub found: bool,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SendWorkingDirectoryArgs {
    /// The agent's current working directory
    pub working_directory: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SendFoundFilesArgs {
    /// Pattern that was searched for
    pub pattern: String,
    /// Matching file paths
    pub files: Vec<String>,
    /// Directory the search started from
    #[serde(default)]
    pub start_path: Option<String>,
}

/// Build the read/write policy for the current project, with the
/// agent-reported working directory as project root.
async fn project_policy(
    state: &Arc<ServerState>,
) -> Result<ReadWriteSecurityPolicy, ToolResult> {
    let session = get_or_create_session(state, None).await.map_err(|e| {
        ToolResult::failure(e.to_string(), ErrorKind::Context)
    })?;
    let project = session.project().await.map_err(|e| {
        ToolResult::failure(e.to_string(), ErrorKind::ConfigReadError)
    })?;

    let mut policy = ReadWriteSecurityPolicy::new(
        &project.allowed_write_paths,
        &project.additional_read_paths,
    );
    if let Some(root) = session.current_dir() {
        policy.set_project_root(root);
    }
    Ok(policy)
}

async fn send_file_content(state: Arc<ServerState>, args: SendFileContentArgs) -> ToolOutput {
    let policy = match project_policy(&state).await {
        Ok(policy) => policy,
        Err(failure) => return failure.into(),
    };

    let validated = policy.validate_read_path(&args.path);
    state.record_violations(policy.violation_count());
    let path = match validated {
        Ok(path) => path,
        Err(e) => {
            return ToolResult::failure(e.to_string(), ErrorKind::Security).into();
        }
    };

    state.file_cache.put(&path, &args.content, args.mtime);
    debug!(path = %path, bytes = args.content.len(), "file content cached");

    let result = ToolResult::ok(json!({
        "path": path,
        "content": args.content,
        "mtime": args.mtime,
        "encoding": args.encoding,
    }))
    .with_message(format!("File content cached for {}", path));

    ToolOutput::with_event(
        result,
        EventType::FS_FILE_CONTENT,
        EventData::FileContent {
            path,
            content: args.content,
            mtime: args.mtime,
            encoding: args.encoding,
        },
    )
}

async fn send_directory_listing(
    state: Arc<ServerState>,
    args: SendDirectoryListingArgs,
) -> ToolOutput {
    let policy = match project_policy(&state).await {
        Ok(policy) => policy,
        Err(failure) => return failure.into(),
    };

    let validated = policy.validate_read_path(&args.path);
    state.record_violations(policy.violation_count());
    let path = match validated {
        Ok(path) => path,
        Err(e) => {
            return ToolResult::failure(e.to_string(), ErrorKind::Security).into();
        }
    };

    let files: Vec<DirEntry> = args
        .files
        .into_iter()
        .map(ListingEntry::into_dir_entry)
        .collect();

    let result = ToolResult::ok(json!({
        "path": path,
        "count": files.len(),
        "pattern": args.pattern,
        "recursive": args.recursive,
    }))
    .with_message(format!("Directory listing provided for {}", path));

    ToolOutput::with_event(
        result,
        EventType::FS_DIRECTORY,
        EventData::Directory { path, files },
    )
}

async fn send_command_location(
    _state: Arc<ServerState>,
    args: SendCommandLocationArgs,
) -> ToolOutput {
    let result = ToolResult::ok(json!({
        "command": args.command,
        "path": args.path,
        "found": args.found,
    }))
    .with_message(format!("Command location provided for {}", args.command));

    ToolOutput::with_event(
        result,
        EventType::FS_COMMAND,
        EventData::Command {
            command: args.command,
            path: args.path,
            found: args.found,
        },
    )
}

async fn send_working_directory(
    _state: Arc<ServerState>,
    args: SendWorkingDirectoryArgs,
) -> ToolOutput {
    let result = ToolResult::ok(json!({
        "working_directory": args.working_directory,
    }))
    .with_message(format!(
        "Working directory provided: {}",
        args.working_directory
    ));

    ToolOutput::with_event(
        result,
        EventType::FS_CWD,
        EventData::Cwd {
            working_directory: args.working_directory,
        },
    )
}

async fn send_found_files(_state: Arc<ServerState>, args: SendFoundFilesArgs) -> ToolOutput {
    ToolResult::ok(json!({
        "pattern": args.pattern,
        "start_path": args.start_path,
        "count": args.files.len(),
        "files": args.files,
    }))
    .with_message(format!(
        "Found {} files matching '{}'",
        args.files.len(),
        args.pattern
    ))
    .into()
}

/// Register the five callback tools.
pub fn register(registry: &ToolRegistry) {
    registry.add::<SendFileContentArgs, _, _>(
        "send_file_content",
        "Send file content from the agent's filesystem to the server.",
        send_file_content,
    );
    registry.add::<SendDirectoryListingArgs, _, _>(
        "send_directory_listing",
        "Send a directory listing from the agent's filesystem to the server.",
        send_directory_listing,
    );
    registry.add::<SendCommandLocationArgs, _, _>(
        "send_command_location",
        "Report the location of an executable on the agent's system.",
        send_command_location,
    );
    registry.add::<SendWorkingDirectoryArgs, _, _>(
        "send_working_directory",
        "Report the agent's current working directory.",
        send_working_directory,
    );
    registry.add::<SendFoundFilesArgs, _, _>(
        "send_found_files",
        "Report files found on the agent's filesystem for a pattern search.",
        send_found_files,
    );
}

#[cfg(test)]
#[path = "callbacks_tests.rs"]
mod tests;
