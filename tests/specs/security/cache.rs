//! FileCache boundary behavior.

use gp_fsbridge::FileCache;

#[test]
fn count_bound_evicts_exactly_one() {
    let cache = FileCache::with_limits(1024 * 1024, 4);
    for i in 0..5 {
        cache.put(&format!("file-{}", i), "content", None);
    }

    let stats = cache.stats();
    assert_eq!(stats.entries, 4);
    assert_eq!(stats.evictions, 1);
    assert!(cache.get("file-0", None).is_none(), "LRU entry evicted");
    assert!(cache.get("file-4", None).is_some());
}

#[test]
fn oversize_entry_is_rejected_not_stored() {
    let cache = FileCache::with_limits(16, 100);
    cache.put("keep", "0123456789", None);

    let inserted = cache.put("huge", "this content exceeds the cache limit", None);

    assert!(!inserted);
    assert_eq!(cache.stats().rejections, 1);
    assert_eq!(
        cache.get("keep", None),
        Some("0123456789".to_string()),
        "existing entries survive an oversize rejection"
    );
}

#[test]
fn stale_mtime_invalidates_on_read() {
    let cache = FileCache::new();
    cache.put("file.md", "old contents", Some(1_000.0));

    assert_eq!(cache.get("file.md", Some(2_000.0)), None);
    assert!(cache.is_empty());
    assert_eq!(cache.stats().invalidations, 1);
}
