//! Shared application state for the collector.
//!
//! Registers every configured metric up front; any invalid store settings
//! fail startup before the listener is bound.

use std::sync::Arc;

use labelstore_core::error::{LabelStoreError, Result};

use crate::config::CollectorConfig;
use crate::registry::MetricRegistry;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: CollectorConfig,
    registry: MetricRegistry,
}

impl AppState {
    /// Build application state.
    /// Returns Result so main can handle errors gracefully (no panic).
    pub fn new(cfg: CollectorConfig) -> Result<Self> {
        let registry = MetricRegistry::new();
        for m in &cfg.metrics {
            registry.register(m).map_err(|e| match e {
                LabelStoreError::InvalidStoreSettings(msg) => {
                    LabelStoreError::InvalidStoreSettings(format!("metric {}: {msg}", m.name))
                }
                other => other,
            })?;
        }

        Ok(Self {
            inner: Arc::new(AppStateInner { cfg, registry }),
        })
    }

    pub fn cfg(&self) -> &CollectorConfig {
        &self.inner.cfg
    }

    pub fn registry(&self) -> &MetricRegistry {
        &self.inner.registry
    }
}
