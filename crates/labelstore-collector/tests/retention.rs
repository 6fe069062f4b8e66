//! Retention tracking and the background timers.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use labelstore_collector::metric::{Metric, MetricKind, MetricTimers};
use labelstore_collector::registry::MetricRegistry;
use labelstore_collector::retention::RetentionTracker;
use labelstore_collector::scheduler::Scheduler;
use labelstore_core::{LabelSet, MetricSettings, MetricStore};

fn labels(v: i64) -> LabelSet {
    LabelSet::new([("bar", v), ("baz", 100)])
}

fn store() -> MetricStore {
    MetricStore::new(MetricSettings::default())
}

#[test]
fn sweep_removes_only_stale_entries() {
    let store = store();
    let tracker = RetentionTracker::new(Duration::from_secs(10));
    let t0 = Instant::now();

    store.set(&labels(1), 5.0);
    tracker.touch_at(&labels(1), t0);
    store.set(&labels(2), 7.0);
    tracker.touch_at(&labels(2), t0 + Duration::from_secs(8));

    assert_eq!(tracker.sweep(t0 + Duration::from_secs(10), &store), 0);
    assert_eq!(tracker.sweep(t0 + Duration::from_secs(11), &store), 1);

    assert_eq!(store.get(&labels(1)), 0.0);
    assert_eq!(store.get(&labels(2)), 7.0);
    assert_eq!(store.len(), 1);
    assert_eq!(tracker.len(), 1);
}

#[test]
fn touch_refreshes_last_seen() {
    let store = store();
    let tracker = RetentionTracker::new(Duration::from_secs(1));
    let t0 = Instant::now();

    store.set(&labels(1), 1.0);
    tracker.touch_at(&labels(1), t0);
    tracker.touch_at(&labels(1), t0 + Duration::from_secs(5));

    assert_eq!(tracker.sweep(t0 + Duration::from_secs(5), &store), 0);
    assert_eq!(store.get(&labels(1)), 1.0);
}

#[test]
fn metric_sweep_without_retention_is_noop() {
    let m = Metric::new("plain", MetricKind::Counter, "", store(), MetricTimers::default());
    m.observe(&labels(1), 1.0).unwrap();
    assert_eq!(m.sweep_expired(Instant::now() + Duration::from_secs(3600)), 0);
    assert_eq!(m.get(&labels(1)), 1.0);
}

#[test]
fn metric_sweep_with_retention() {
    let timers = MetricTimers {
        retention: Some(Duration::from_secs(1)),
        ..MetricTimers::default()
    };
    let m = Metric::new("kept", MetricKind::Counter, "", store(), timers);
    m.observe(&labels(1), 100.0).unwrap();
    assert_eq!(m.get(&labels(1)), 100.0);

    assert_eq!(m.sweep_expired(Instant::now() + Duration::from_secs(2)), 1);
    assert_eq!(m.get(&labels(1)), 0.0);
    assert!(m.values().is_empty());
}

#[tokio::test]
async fn scheduler_expires_inactive_label_sets() {
    let registry = MetricRegistry::new();
    let timers = MetricTimers {
        retention: Some(Duration::from_millis(50)),
        retention_check_interval: Duration::from_millis(20),
        reset_after: None,
    };
    let m = registry
        .insert(Metric::new("simple", MetricKind::Counter, "", store(), timers))
        .unwrap();
    let scheduler = Scheduler::start(&registry);
    assert_eq!(scheduler.len(), 1);

    m.observe(&labels(1), 100.0).unwrap();
    assert_eq!(m.get(&labels(1)), 100.0);

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(m.get(&labels(1)), 0.0);
    assert!(m.values().is_empty());
    scheduler.shutdown();
}

#[tokio::test]
async fn scheduler_resets_values_keeping_keys() {
    let registry = MetricRegistry::new();
    let timers = MetricTimers {
        reset_after: Some(Duration::from_millis(30)),
        ..MetricTimers::default()
    };
    let m = registry
        .insert(Metric::new("simple", MetricKind::Gauge, "", store(), timers))
        .unwrap();
    let scheduler = Scheduler::start(&registry);

    m.observe(&LabelSet::default(), 100.0).unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    let values = m.values();
    assert_eq!(values.len(), 1);
    assert_eq!(values.get(&LabelSet::default()), Some(&0.0));
    drop(scheduler);
}

#[tokio::test]
async fn dropped_scheduler_stops_timers() {
    let registry = MetricRegistry::new();
    let timers = MetricTimers {
        reset_after: Some(Duration::from_millis(20)),
        ..MetricTimers::default()
    };
    let m = registry
        .insert(Metric::new("simple", MetricKind::Gauge, "", store(), timers))
        .unwrap();
    Scheduler::start(&registry).shutdown();
    tokio::task::yield_now().await;

    m.observe(&LabelSet::default(), 5.0).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(m.get(&LabelSet::default()), 5.0);
}

fn retained(max_age: Duration) -> Metric {
    let timers = MetricTimers {
        retention: Some(max_age),
        ..MetricTimers::default()
    };
    Metric::new("kept", MetricKind::Counter, "", store(), timers)
}

#[test]
fn metric_remove_clears_store_and_tracker() {
    let m = retained(Duration::from_secs(1));
    m.observe(&labels(1), 3.0).unwrap();
    m.observe(&labels(2), 4.0).unwrap();

    assert!(m.remove(&labels(1)));
    assert!(!m.remove(&labels(1)));
    assert_eq!(m.get(&labels(1)), 0.0);

    // only the surviving entry is left to expire
    assert_eq!(m.sweep_expired(Instant::now() + Duration::from_secs(2)), 1);
    assert!(m.values().is_empty());
}

#[test]
fn metric_remove_without_retention() {
    let m = Metric::new("plain", MetricKind::Gauge, "", store(), MetricTimers::default());
    m.observe(&labels(1), 3.0).unwrap();
    assert!(m.remove(&labels(1)));
    assert!(m.values().is_empty());
}

#[test]
fn concurrent_observe_and_remove_leave_no_untracked_entries() {
    let m = Arc::new(retained(Duration::from_secs(1)));

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let m = Arc::clone(&m);
            thread::spawn(move || {
                for i in 0..5_000 {
                    let l = labels(i % 8);
                    if (i + t) % 3 == 0 {
                        m.remove(&l);
                    } else {
                        m.observe(&l, 1.0).unwrap();
                    }
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    // every stored entry is still known to the tracker, so it can expire
    m.sweep_expired(Instant::now() + Duration::from_secs(2));
    assert!(m.values().is_empty());
    assert_eq!(m.store().len(), 0);
}
