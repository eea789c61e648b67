// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! System directory blacklist for read operations.

/// Directories that must never be readable regardless of policy
/// configuration. The blacklist dominates `additional_read_paths`.
pub const SYSTEM_DIRECTORY_BLACKLIST: &[&str] = &[
    // Unix/Linux system directories
    "/etc",
    "/usr/bin",
    "/usr/sbin",
    "/bin",
    "/sbin",
    "/boot",
    "/dev",
    "/proc",
    "/sys",
    "/root",
    // SSH key directories (Unix/Linux/macOS)
    "/home/*/.ssh",
    "/Users/*/.ssh",
    "/root/.ssh",
    // Windows system directories
    "C:\\Windows",
    "C:\\Program Files",
    "C:\\Program Files (x86)",
    "C:\\System32",
    // Additional sensitive directories
    "/var/log",
    "/var/run",
    "/var/lib",
];

/// Check whether `path` falls inside a blacklisted system directory.
///
/// The check is lexical: no filesystem access, no symlink resolution. The
/// agent reports paths from its own host, which may not exist here.
pub fn is_system_directory(path: &str) -> bool {
    let normalized = path.replace('\\', "/");

    for blacklisted in SYSTEM_DIRECTORY_BLACKLIST {
        if blacklisted.contains('*') {
            // SSH directory patterns: /home/*/.ssh and friends
            let wants_home = blacklisted.starts_with("/home/");
            let wants_users = blacklisted.starts_with("/Users/");
            if normalized.contains("/.ssh")
                && ((wants_home && normalized.starts_with("/home/"))
                    || (wants_users && normalized.starts_with("/Users/")))
            {
                return true;
            }
            continue;
        }

        let prefix = blacklisted.replace('\\', "/");
        if normalized == prefix || normalized.starts_with(&format!("{}/", prefix)) {
            return true;
        }
    }

    false
}

#[cfg(test)]
#[path = "system_dirs_tests.rs"]
mod tests;
