//! Per-metric value store.
//!
//! One mutex-guarded `HashMap<LabelSet, Slot>` per metric. Every operation
//! holds the lock for its whole duration, so each call is atomic with respect
//! to every other call on the same store. Stores for different metrics share
//! nothing.
//!
//! Each slot carries the sequence number it was inserted with. Insertion order
//! is reconstructed by sorting on it in [`MetricStore::all_values`], which
//! keeps `remove` O(1).
//!
//! Top-K is a read-time projection applied by `all_values`; the underlying map
//! is never truncated by it.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use indexmap::IndexMap;

use crate::factory::MetricSettings;
use crate::labels::LabelSet;

/// Owned copy of a store's entries, always in insertion order. With top-K the
/// selected entries keep that order too.
pub type Snapshot = IndexMap<LabelSet, f64>;

#[derive(Debug, Clone, Copy)]
struct Slot {
    seq: u64,
    value: f64,
}

#[derive(Debug, Default)]
struct Inner {
    slots: HashMap<LabelSet, Slot>,
    next_seq: u64,
}

impl Inner {
    fn upsert(&mut self, labels: &LabelSet, f: impl FnOnce(f64) -> f64) {
        match self.slots.get_mut(labels) {
            Some(slot) => slot.value = f(slot.value),
            None => {
                let seq = self.next_seq;
                self.next_seq += 1;
                self.slots.insert(labels.clone(), Slot { seq, value: f(0.0) });
            }
        }
    }
}

#[derive(Debug)]
pub struct MetricStore {
    topk: usize,
    inner: Mutex<Inner>,
}

impl MetricStore {
    pub fn new(settings: MetricSettings) -> Self {
        Self {
            topk: settings.topk,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Every critical section leaves the map consistent, so a poisoned lock
    /// is safe to reuse.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// `0` means unbounded.
    pub fn topk(&self) -> usize {
        self.topk
    }

    /// Overwrite the value for `labels`.
    pub fn set(&self, labels: &LabelSet, value: impl Into<f64>) {
        let value = value.into();
        self.lock().upsert(labels, |_| value);
    }

    /// Add `by` to the value for `labels`, starting from `0.0` if absent.
    pub fn increment(&self, labels: &LabelSet, by: impl Into<f64>) {
        let by = by.into();
        self.lock().upsert(labels, |v| v + by);
    }

    /// Current value for `labels`; `0.0` if absent. Does not insert.
    pub fn get(&self, labels: &LabelSet) -> f64 {
        self.lock().slots.get(labels).map(|s| s.value).unwrap_or(0.0)
    }

    /// Delete the entry for `labels`. Returns whether it existed.
    pub fn remove(&self, labels: &LabelSet) -> bool {
        self.lock().slots.remove(labels).is_some()
    }

    /// Snapshot of all entries in insertion order. When `topk > 0` only the
    /// `topk` highest values are kept; among equal values the earlier
    /// inserted wins.
    pub fn all_values(&self) -> Snapshot {
        let inner = self.lock();
        let mut entries: Vec<(&LabelSet, Slot)> =
            inner.slots.iter().map(|(k, s)| (k, *s)).collect();

        if self.topk > 0 && entries.len() > self.topk {
            entries.sort_by(|a, b| descending(a.1.value, b.1.value).then(a.1.seq.cmp(&b.1.seq)));
            entries.truncate(self.topk);
        }
        entries.sort_by_key(|(_, s)| s.seq);

        entries
            .into_iter()
            .map(|(k, s)| (k.clone(), s.value))
            .collect()
    }

    /// Zero every existing entry in place.
    pub fn reset_values(&self) {
        for slot in self.lock().slots.values_mut() {
            slot.value = 0.0;
        }
    }

    pub fn len(&self) -> usize {
        self.lock().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().slots.is_empty()
    }
}

/// Descending numeric order with NaN ranked last.
fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a)
        .unwrap_or_else(|| a.is_nan().cmp(&b.is_nan()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descending_puts_nan_last() {
        let mut v = vec![1.0, f64::NAN, 3.0, 2.0];
        v.sort_by(|a, b| descending(*a, *b));
        assert_eq!(&v[..3], &[3.0, 2.0, 1.0]);
        assert!(v[3].is_nan());
    }

    #[test]
    fn reinsert_after_remove_goes_last() {
        let s = MetricStore::new(MetricSettings::default());
        let a = LabelSet::new([("k", "a")]);
        let b = LabelSet::new([("k", "b")]);
        s.set(&a, 1.0);
        s.set(&b, 1.0);
        s.remove(&a);
        s.set(&a, 1.0);
        let keys: Vec<LabelSet> = s.all_values().into_keys().collect();
        assert_eq!(keys, vec![b, a]);
    }
}
