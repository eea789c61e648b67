//! Subscription lifecycle invariants.

use crate::prelude::*;
use gp_core::EventType;
use std::time::Duration;

#[tokio::test]
async fn unsubscribe_removes_every_subscription_for_the_task() {
    let (manager, _clock) = manager_with_clock();
    let probe = Probe::new("probe", Reply::Handled);
    let bystander = Probe::new("bystander", Reply::Handled);

    manager
        .subscribe(probe.clone(), EventType::FS_CWD, None)
        .unwrap();
    manager
        .subscribe(
            probe.clone(),
            EventType::TIMER,
            Some(Duration::from_secs(1)),
        )
        .unwrap();
    manager
        .subscribe(bystander.clone(), EventType::FS_CWD, None)
        .unwrap();

    manager.unsubscribe("probe");

    manager.dispatch_event(EventType::FS_CWD, &cwd_event()).await;
    assert_eq!(probe.event_count(), 0, "unsubscribed task sees nothing");
    assert_eq!(bystander.event_count(), 1);

    let stats = manager.get_task_statistics();
    assert!(stats.running.iter().all(|view| view.name != "probe"));
}

#[tokio::test]
async fn dispatch_only_matches_intersecting_masks() {
    let (manager, _clock) = manager_with_clock();
    let cwd_watcher = Probe::new("cwd", Reply::Handled);
    let dir_watcher = Probe::new("dir", Reply::Handled);

    manager
        .subscribe(cwd_watcher.clone(), EventType::FS_CWD, None)
        .unwrap();
    manager
        .subscribe(dir_watcher.clone(), EventType::FS_DIRECTORY, None)
        .unwrap();

    let outcome = manager.dispatch_event(EventType::FS_CWD, &cwd_event()).await;

    assert_eq!(outcome.status(), "processed");
    assert_eq!(cwd_watcher.event_count(), 1);
    assert_eq!(dir_watcher.event_count(), 0);
}

#[tokio::test]
async fn unmatched_events_are_acknowledged() {
    let (manager, _clock) = manager_with_clock();
    let probe = Probe::new("probe", Reply::Ignored);
    manager
        .subscribe(probe, EventType::FS_CWD, None)
        .unwrap();

    let outcome = manager.dispatch_event(EventType::FS_CWD, &cwd_event()).await;
    assert_eq!(outcome.status(), "acknowledged");
    assert_eq!(outcome.to_value()["status"], "acknowledged");
}

#[tokio::test]
async fn statistics_count_unique_tasks_and_track_peak() {
    let (manager, _clock) = manager_with_clock();
    let multi = Probe::new("multi", Reply::Handled);
    manager
        .subscribe(multi.clone(), EventType::FS_CWD, None)
        .unwrap();
    manager
        .subscribe(multi.clone(), EventType::FS_DIRECTORY, None)
        .unwrap();
    manager
        .subscribe(multi, EventType::FS_COMMAND, None)
        .unwrap();

    let stats = manager.get_task_statistics();
    assert_eq!(stats.count, 1, "three subscriptions, one task");
    assert_eq!(stats.peak_count, 3);

    manager.unsubscribe("multi");
    let stats = manager.get_task_statistics();
    assert_eq!(stats.count, 0);
    assert_eq!(stats.peak_count, 3, "peak never decreases");
}

#[tokio::test]
async fn last_data_is_recorded_even_for_unhandled_events() {
    let (manager, _clock) = manager_with_clock();
    let probe = Probe::new("ignorer", Reply::Ignored);
    manager
        .subscribe(probe, EventType::FS_CWD, None)
        .unwrap();

    let before = manager.get_task_statistics();
    assert!(before.running[0].last_data.is_none());

    manager.dispatch_event(EventType::FS_CWD, &cwd_event()).await;

    let after = manager.get_task_statistics();
    assert!(after.running[0].last_data.is_some());
}
