//! Last-seen bookkeeping for time-based retention.
//!
//! The store itself has no clock; this tracker records when each label set
//! was last observed and removes stale ones from the store on `sweep`.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use labelstore_core::{LabelSet, MetricStore};

#[derive(Debug)]
pub struct RetentionTracker {
    max_age: Duration,
    last_seen: Mutex<HashMap<LabelSet, Instant>>,
}

impl RetentionTracker {
    pub fn new(max_age: Duration) -> Self {
        Self {
            max_age,
            last_seen: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<LabelSet, Instant>> {
        self.last_seen.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    pub fn touch_at(&self, labels: &LabelSet, at: Instant) {
        Self::stamp(&mut self.lock(), labels, at);
    }

    fn stamp(seen: &mut HashMap<LabelSet, Instant>, labels: &LabelSet, at: Instant) {
        match seen.get_mut(labels) {
            Some(t) => *t = at,
            None => {
                seen.insert(labels.clone(), at);
            }
        }
    }

    /// Stamp `labels` as seen at `at` and run the store `write` under the
    /// tracker lock, so the write cannot interleave with `remove` or `sweep`.
    pub fn record<R>(&self, labels: &LabelSet, at: Instant, write: impl FnOnce() -> R) -> R {
        let mut seen = self.lock();
        Self::stamp(&mut seen, labels, at);
        write()
    }

    /// Drop `labels` from both the tracker and `store`.
    pub fn remove(&self, labels: &LabelSet, store: &MetricStore) -> bool {
        let mut seen = self.lock();
        seen.remove(labels);
        store.remove(labels)
    }

    /// Number of tracked label sets.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Remove every label set older than `max_age` at `now` from both the
    /// tracker and `store`. Runs in one pass under the tracker lock; each
    /// store removal is O(1).
    pub fn sweep(&self, now: Instant, store: &MetricStore) -> usize {
        let mut seen = self.lock();
        let before = seen.len();
        seen.retain(|labels, at| {
            let fresh = now.saturating_duration_since(*at) <= self.max_age;
            if !fresh {
                store.remove(labels);
            }
            fresh
        });
        before - seen.len()
    }
}
