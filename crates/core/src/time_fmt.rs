// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Compact time rendering for task statistics and change listings.

/// Render a span of seconds at its coarsest useful unit: `"42s"`, `"7m"`,
/// `"2h"`, `"1h12m"`, `"4d"`.
///
/// Minutes ride along with hours when non-zero; everything finer than the
/// leading unit is otherwise dropped. Spans under a second (including the
/// negative deltas a statistics snapshot can briefly produce) render as
/// `"0s"`.
pub fn format_duration(secs: f64) -> String {
    if secs < 1.0 {
        return "0s".to_string();
    }

    let total = secs as u64;
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;

    if days > 0 {
        format!("{}d", days)
    } else if hours > 0 && minutes > 0 {
        format!("{}h{}m", hours, minutes)
    } else if hours > 0 {
        format!("{}h", hours)
    } else if minutes > 0 {
        format!("{}m", minutes)
    } else {
        format!("{}s", total)
    }
}

/// Format an age in seconds as `"{N}d{H}h ago"`, `"{H}h{M}m ago"` or `"{M}m ago"`.
///
/// Used for change listings where sub-minute precision is noise.
pub fn humanize_age(secs: f64) -> String {
    let secs = secs.max(0.0) as u64;
    let days = secs / 86400;
    let hours = (secs % 86400) / 3600;
    let minutes = (secs % 3600) / 60;

    if days > 0 {
        format!("{}d{}h ago", days, hours)
    } else if hours > 0 {
        format!("{}h{}m ago", hours, minutes)
    } else {
        format!("{}m ago", minutes)
    }
}

#[cfg(test)]
#[path = "time_fmt_tests.rs"]
mod tests;
