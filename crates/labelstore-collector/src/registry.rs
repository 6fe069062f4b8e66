//! Metric registry: metric name -> [`Metric`].
//!
//! Owned by the application state and handed to the scheduler and exporter;
//! there is no process-global registry.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use labelstore_core::error::{LabelStoreError, Result};
use labelstore_core::{LabelSet, StoreFactory};

use crate::config::MetricConfig;
use crate::metric::Metric;

#[derive(Default)]
pub struct MetricRegistry {
    factory: StoreFactory,
    metrics: DashMap<String, Arc<Metric>>,
}

impl MetricRegistry {
    pub fn new() -> Self {
        Self {
            factory: StoreFactory::new(),
            metrics: DashMap::new(),
        }
    }

    /// Build the store for `def` and register it. Fails on invalid store
    /// settings or a duplicate name.
    pub fn register(&self, def: &MetricConfig) -> Result<Arc<Metric>> {
        let store = self
            .factory
            .create_with_defaults(&def.name, &def.store_settings())?;
        let metric = Metric::new(def.name.clone(), def.kind, def.desc.clone(), store, def.timers());
        self.insert(metric)
    }

    pub fn insert(&self, metric: Metric) -> Result<Arc<Metric>> {
        match self.metrics.entry(metric.name().to_string()) {
            Entry::Occupied(_) => Err(LabelStoreError::DuplicateMetric(metric.name().to_string())),
            Entry::Vacant(slot) => {
                let metric = Arc::new(metric);
                tracing::info!(
                    metric = %metric.name(),
                    kind = metric.kind().as_str(),
                    topk = metric.store().topk(),
                    timers = ?metric.timers(),
                    "metric registered"
                );
                slot.insert(Arc::clone(&metric));
                Ok(metric)
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<Metric>> {
        self.metrics.get(name).map(|r| Arc::clone(r.value()))
    }

    /// All metrics, sorted by name.
    pub fn metrics(&self) -> Vec<Arc<Metric>> {
        let mut all: Vec<Arc<Metric>> = self.metrics.iter().map(|r| Arc::clone(r.value())).collect();
        all.sort_by(|a, b| a.name().cmp(b.name()));
        all
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Route one observation to its metric.
    pub fn observe(&self, name: &str, labels: &LabelSet, value: f64) -> Result<()> {
        let metric = self
            .get(name)
            .ok_or_else(|| LabelStoreError::UnknownMetric(name.to_string()))?;
        metric.observe(labels, value)
    }
}
