//! Timer fan-out and one-shot downgrade behavior.

use crate::prelude::*;
use gp_core::EventType;
use std::time::Duration;

#[tokio::test]
async fn timer_fan_out_reaches_every_subscriber() {
    let (manager, clock) = manager_with_clock();
    let a = Probe::new("a", Reply::Handled);
    let b = Probe::new("b", Reply::Handled);
    let interval = Duration::from_millis(50);

    manager
        .subscribe(a.clone(), EventType::TIMER, Some(interval))
        .unwrap();
    manager
        .subscribe(b.clone(), EventType::TIMER, Some(interval))
        .unwrap();

    // Advance virtual time 0.25s in 50ms steps
    for _ in 0..5 {
        clock.advance(Duration::from_millis(50));
        manager.run_due_timers().await;
    }

    assert!(a.event_count() >= 4, "a fired {}", a.event_count());
    assert!(b.event_count() >= 4, "b fired {}", b.event_count());
    assert!(manager.get_task_statistics().total_timer_runs >= 8);
}

#[tokio::test]
async fn timer_payload_carries_interval_and_timestamp() {
    let (manager, clock) = manager_with_clock();
    let probe = Probe::new("probe", Reply::Handled);
    manager
        .subscribe(probe.clone(), EventType::TIMER, Some(Duration::from_secs(5)))
        .unwrap();

    clock.advance(Duration::from_secs(6));
    manager.run_due_timers().await;

    let events = probe.events.lock();
    match &events[0] {
        gp_core::EventData::Timer {
            timer_interval,
            timestamp,
        } => {
            assert_eq!(*timer_interval, 5.0);
            assert!(*timestamp > 0.0);
        }
        other => panic!("unexpected payload: {:?}", other),
    }
}

#[tokio::test]
async fn zero_interval_is_rejected() {
    let (manager, _clock) = manager_with_clock();
    let probe = Probe::new("probe", Reply::Handled);
    assert!(manager
        .subscribe(probe, EventType::TIMER, Some(Duration::ZERO))
        .is_err());
}

#[tokio::test]
async fn timer_once_fires_exactly_once() {
    let (manager, clock) = manager_with_clock();
    let probe = Probe::new("oneshot", Reply::Handled);
    manager
        .subscribe(
            probe.clone(),
            EventType::TIMER_ONCE,
            Some(Duration::from_secs(1)),
        )
        .unwrap();

    clock.advance(Duration::from_secs(2));
    manager.run_due_timers().await;
    assert_eq!(probe.event_count(), 1);

    // After the handled one-shot, no interval remains armed
    clock.advance(Duration::from_secs(100));
    assert!(manager.run_due_timers().await.is_none());
    assert_eq!(probe.event_count(), 1);
}

#[tokio::test]
async fn failing_handler_does_not_stop_the_timer_path() {
    let (manager, clock) = manager_with_clock();
    let failing = Probe::new("failing", Reply::Failing);
    let healthy = Probe::new("healthy", Reply::Handled);
    let interval = Duration::from_secs(1);

    manager
        .subscribe(failing.clone(), EventType::TIMER, Some(interval))
        .unwrap();
    manager
        .subscribe(healthy.clone(), EventType::TIMER, Some(interval))
        .unwrap();

    for _ in 0..3 {
        clock.advance(Duration::from_secs(1));
        manager.run_due_timers().await;
    }

    assert!(failing.event_count() >= 3);
    assert!(healthy.event_count() >= 3);
}
