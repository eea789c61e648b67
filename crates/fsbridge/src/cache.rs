// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! LRU cache for agent-delivered file contents.

use indexmap::IndexMap;
use parking_lot::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

const DEFAULT_MAX_SIZE: usize = 10 * 1024 * 1024;
const DEFAULT_MAX_ENTRIES: usize = 1000;

#[derive(Debug, Clone)]
struct CacheEntry {
    content: String,
    size: usize,
    mtime: f64,
    #[allow(dead_code)]
    cached_at: f64,
    access_count: u64,
}

/// Counters exposed for diagnostics and template context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub invalidations: u64,
    pub rejections: u64,
    pub entries: usize,
    pub size_bytes: usize,
}

#[derive(Default)]
struct CacheState {
    entries: IndexMap<String, CacheEntry>,
    current_size: usize,
    hits: u64,
    misses: u64,
    evictions: u64,
    invalidations: u64,
    rejections: u64,
}

/// Size- and count-bounded LRU cache keyed by path.
///
/// Entries are invalidated on `get` when the caller supplies a newer mtime.
/// An entry larger than `max_size` on its own is rejected outright rather
/// than evicting the whole cache for it.
pub struct FileCache {
    max_size: usize,
    max_entries: usize,
    state: Mutex<CacheState>,
}

impl FileCache {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_MAX_SIZE, DEFAULT_MAX_ENTRIES)
    }

    pub fn with_limits(max_size: usize, max_entries: usize) -> Self {
        Self {
            max_size,
            max_entries,
            state: Mutex::new(CacheState::default()),
        }
    }

    /// Get cached content, refreshing recency.
    ///
    /// When `current_mtime` is supplied and the cached entry is older, the
    /// entry is dropped and the call counts as a miss.
    pub fn get(&self, path: &str, current_mtime: Option<f64>) -> Option<String> {
        let mut state = self.state.lock();

        let Some(entry) = state.entries.get(path) else {
            state.misses += 1;
            return None;
        };

        if let Some(mtime) = current_mtime {
            if entry.mtime < mtime {
                if let Some(stale) = state.entries.shift_remove(path) {
                    state.current_size -= stale.size;
                    state.invalidations += 1;
                }
                state.misses += 1;
                return None;
            }
        }

        // Move to the MRU end
        let mut entry = match state.entries.shift_remove(path) {
            Some(entry) => entry,
            None => {
                state.misses += 1;
                return None;
            }
        };
        entry.access_count += 1;
        let content = entry.content.clone();
        state.entries.insert(path.to_string(), entry);
        state.hits += 1;
        Some(content)
    }

    /// Cache content for a path. Returns false when the entry alone exceeds
    /// the cache size limit.
    pub fn put(&self, path: &str, content: &str, mtime: Option<f64>) -> bool {
        let content_size = content.len();
        let mut state = self.state.lock();

        if content_size > self.max_size {
            state.rejections += 1;
            debug!(path, size = content_size, "oversize entry rejected");
            return false;
        }

        if let Some(existing) = state.entries.shift_remove(path) {
            state.current_size -= existing.size;
        }

        // Evict by count, then by size
        while state.entries.len() >= self.max_entries {
            evict_lru(&mut state);
        }
        while state.current_size + content_size > self.max_size && !state.entries.is_empty() {
            evict_lru(&mut state);
        }

        let now = epoch_now();
        state.entries.insert(
            path.to_string(),
            CacheEntry {
                content: content.to_string(),
                size: content_size,
                mtime: mtime.unwrap_or(now),
                cached_at: now,
                access_count: 0,
            },
        );
        state.current_size += content_size;
        true
    }

    /// Remove a cached entry. Returns true when an entry was present.
    pub fn invalidate(&self, path: &str) -> bool {
        let mut state = self.state.lock();
        match state.entries.shift_remove(path) {
            Some(entry) => {
                state.current_size -= entry.size;
                state.invalidations += 1;
                true
            }
            None => false,
        }
    }

    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.entries.clear();
        state.current_size = 0;
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        CacheStats {
            hits: state.hits,
            misses: state.misses,
            evictions: state.evictions,
            invalidations: state.invalidations,
            rejections: state.rejections,
            entries: state.entries.len(),
            size_bytes: state.current_size,
        }
    }
}

impl Default for FileCache {
    fn default() -> Self {
        Self::new()
    }
}

fn evict_lru(state: &mut CacheState) {
    if let Some((_, entry)) = state.entries.shift_remove_index(0) {
        state.current_size -= entry.size;
        state.evictions += 1;
    }
}

fn epoch_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
