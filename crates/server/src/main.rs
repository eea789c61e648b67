// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Guidepost MCP server.
//!
//! Serves tools and the guide prompt over stdio. Logging goes to a file:
//! stdout belongs to the MCP transport.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use gp_config::ConfigManager;
use gp_server::{GuidepostService, ServerState};
use rmcp::ServiceExt;
use std::path::{Path, PathBuf};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("guidepost {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("guidepost {}", env!("CARGO_PKG_VERSION"));
                println!("Guidepost MCP server - project documentation and configuration");
                println!();
                println!("USAGE:");
                println!("    guidepost");
                println!();
                println!("The server speaks MCP over stdio and is typically launched by an");
                println!("agent client, not invoked directly.");
                println!();
                println!("OPTIONS:");
                println!("    -h, --help       Print help information");
                println!("    -v, --version    Print version information");
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: guidepost [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    let config = ConfigManager::new()?;

    let log_path = log_file_path(&config);
    rotate_log_if_needed(&log_path);
    let _log_guard = setup_logging(&log_path)?;

    info!(version = env!("CARGO_PKG_VERSION"), "starting guidepost");

    let state = ServerState::new(config);
    gp_server::tools::register_all(&state.registry);
    state.clone().start_tasks().await?;
    info!(tools = state.registry.len(), "tool registry ready");

    let service = GuidepostService::new(state);
    let server = service.serve(rmcp::transport::stdio()).await?;
    info!("server ready on stdio");
    server.waiting().await?;

    info!("server stopped");
    Ok(())
}

/// Log file under the state directory, falling back to the config dir.
fn log_file_path(config: &ConfigManager) -> PathBuf {
    dirs::state_dir()
        .map(|dir| dir.join("guidepost"))
        .unwrap_or_else(|| config.config_dir().to_path_buf())
        .join("server.log")
}

/// Maximum log file size before rotation (10 MB).
const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;

/// Number of rotated log files to keep.
const MAX_ROTATED_LOGS: u32 = 3;

/// Rotate the log file if it exceeds [`MAX_LOG_SIZE`].
///
/// Shifts `server.log` → `server.log.1` → `server.log.2` → `server.log.3`,
/// deleting the oldest. Best-effort: rotation failures never block startup.
fn rotate_log_if_needed(log_path: &Path) {
    let size = match std::fs::metadata(log_path) {
        Ok(m) => m.len(),
        Err(_) => return,
    };
    if size < MAX_LOG_SIZE {
        return;
    }

    let log_str = log_path.display().to_string();
    for i in (1..MAX_ROTATED_LOGS).rev() {
        let from = format!("{log_str}.{i}");
        let to = format!("{log_str}.{}", i + 1);
        let _ = std::fs::rename(&from, &to);
    }
    let _ = std::fs::rename(log_path, format!("{log_str}.1"));
}

fn setup_logging(
    log_path: &Path,
) -> Result<tracing_appender::non_blocking::WorkerGuard, std::io::Error> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let parent = log_path
        .parent()
        .ok_or_else(|| std::io::Error::other("log path has no parent"))?;
    std::fs::create_dir_all(parent)?;

    let file_name = log_path
        .file_name()
        .ok_or_else(|| std::io::Error::other("log path has no file name"))?;
    let file_appender = tracing_appender::rolling::never(parent, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(guard)
}
