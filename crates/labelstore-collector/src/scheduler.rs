//! Background timers for retention sweeps and periodic resets.
//!
//! One tokio task per enabled policy per metric. Tasks only call into the
//! metric's synchronous operations; they hold no lock across an await.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::metric::Metric;
use crate::registry::MetricRegistry;

/// Owns the spawned tasks; dropping it aborts them.
#[derive(Default)]
pub struct Scheduler {
    handles: Vec<JoinHandle<()>>,
}

impl Scheduler {
    /// Spawn timers for every registered metric. Must be called inside a
    /// tokio runtime.
    pub fn start(registry: &MetricRegistry) -> Self {
        let mut handles = Vec::new();
        for metric in registry.metrics() {
            let timers = metric.timers();
            if timers.retention.is_some() {
                handles.push(spawn_retention(
                    Arc::clone(&metric),
                    timers.retention_check_interval,
                ));
            }
            if let Some(every) = timers.reset_after {
                handles.push(spawn_reset(Arc::clone(&metric), every));
            }
        }
        tracing::debug!(tasks = handles.len(), "scheduler started");
        Self { handles }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn shutdown(self) {
        drop(self);
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        for h in &self.handles {
            h.abort();
        }
    }
}

fn ticker(every: Duration) -> time::Interval {
    // first tick fires one period from now, not immediately
    let mut tick = time::interval_at(Instant::now() + every, every);
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tick
}

pub fn spawn_retention(metric: Arc<Metric>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut tick = ticker(every);
        loop {
            tick.tick().await;
            let removed = metric.sweep_expired(std::time::Instant::now());
            if removed > 0 {
                tracing::debug!(metric = %metric.name(), removed, "retention sweep");
            }
        }
    })
}

pub fn spawn_reset(metric: Arc<Metric>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut tick = ticker(every);
        loop {
            tick.tick().await;
            metric.reset_values();
            tracing::debug!(metric = %metric.name(), "values reset");
        }
    })
}
