//! Counter/gauge semantics on top of a [`MetricStore`].

use std::time::{Duration, Instant};

use serde::Deserialize;

use labelstore_core::error::{LabelStoreError, Result};
use labelstore_core::{LabelSet, MetricStore, Snapshot};

use crate::retention::RetentionTracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Counter,
    Gauge,
}

impl MetricKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
        }
    }
}

/// Time-based policies. The metric only records them; [`crate::scheduler`]
/// drives them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricTimers {
    pub retention: Option<Duration>,
    pub retention_check_interval: Duration,
    pub reset_after: Option<Duration>,
}

impl Default for MetricTimers {
    fn default() -> Self {
        Self {
            retention: None,
            retention_check_interval: Duration::from_secs(60),
            reset_after: None,
        }
    }
}

#[derive(Debug)]
pub struct Metric {
    name: String,
    kind: MetricKind,
    desc: String,
    store: MetricStore,
    timers: MetricTimers,
    retention: Option<RetentionTracker>,
}

impl Metric {
    pub fn new(
        name: impl Into<String>,
        kind: MetricKind,
        desc: impl Into<String>,
        store: MetricStore,
        timers: MetricTimers,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            desc: desc.into(),
            store,
            retention: timers.retention.map(RetentionTracker::new),
            timers,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn kind(&self) -> MetricKind {
        self.kind
    }
    pub fn desc(&self) -> &str {
        &self.desc
    }
    pub fn timers(&self) -> MetricTimers {
        self.timers
    }
    pub fn store(&self) -> &MetricStore {
        &self.store
    }

    /// Counter: add `value` (must be non-negative). Gauge: set `value`.
    pub fn observe(&self, labels: &LabelSet, value: f64) -> Result<()> {
        if let Some((key, _)) = labels.iter().find(|(k, _)| !is_valid_label_name(k)) {
            return Err(LabelStoreError::BadRequest(format!(
                "metric {}: invalid label name {key:?}",
                self.name
            )));
        }
        if self.kind == MetricKind::Counter && (value < 0.0 || value.is_nan()) {
            return Err(LabelStoreError::InvalidObservation(format!(
                "counter {} cannot be incremented by {value}",
                self.name
            )));
        }

        let write = || match self.kind {
            MetricKind::Counter => self.store.increment(labels, value),
            MetricKind::Gauge => self.store.set(labels, value),
        };
        match &self.retention {
            Some(r) => r.record(labels, Instant::now(), write),
            None => write(),
        }
        Ok(())
    }

    pub fn get(&self, labels: &LabelSet) -> f64 {
        self.store.get(labels)
    }

    pub fn values(&self) -> Snapshot {
        self.store.all_values()
    }

    /// Delete `labels` from the store (and the retention tracker, if any).
    pub fn remove(&self, labels: &LabelSet) -> bool {
        match &self.retention {
            Some(r) => r.remove(labels, &self.store),
            None => self.store.remove(labels),
        }
    }

    pub fn reset_values(&self) {
        self.store.reset_values();
    }

    /// Remove label sets unobserved for longer than the retention period.
    /// Returns how many were removed; `0` when retention is disabled.
    pub fn sweep_expired(&self, now: Instant) -> usize {
        self.retention
            .as_ref()
            .map(|r| r.sweep(now, &self.store))
            .unwrap_or(0)
    }
}

/// `[a-zA-Z_][a-zA-Z0-9_]*`
pub fn is_valid_label_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
