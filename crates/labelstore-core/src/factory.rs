//! Store factory: validates per-metric settings and builds one store per call.
//!
//! Settings arrive untyped (a JSON-like object) because they originate from
//! user configuration. Validation happens here, at registration time, so a bad
//! `topk` never reaches the ingestion path.

use serde_json::{Map, Value};

use crate::error::{LabelStoreError, Result};
use crate::store::MetricStore;

/// Validated store settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricSettings {
    /// Number of highest-valued entries returned by enumeration; `0` = all.
    pub topk: usize,
}

impl MetricSettings {
    /// Validate a raw settings object. `topk` must be present and a
    /// non-negative integer.
    pub fn from_value(settings: &Value) -> Result<Self> {
        let obj = settings.as_object().ok_or_else(|| {
            LabelStoreError::InvalidStoreSettings("settings must be an object".into())
        })?;
        let topk = obj
            .get("topk")
            .ok_or_else(|| LabelStoreError::InvalidStoreSettings("missing :topk key".into()))?;
        // as_u64 rejects negatives and floats alike
        let topk = topk.as_u64().ok_or_else(|| {
            LabelStoreError::InvalidStoreSettings(format!(
                "topk must be a non-negative integer, got {topk}"
            ))
        })?;
        let topk = usize::try_from(topk).map_err(|_| {
            LabelStoreError::InvalidStoreSettings(format!("topk out of range: {topk}"))
        })?;
        Ok(Self { topk })
    }
}

/// Settings merged under caller-provided ones by
/// [`StoreFactory::create_with_defaults`].
pub fn default_metric_settings() -> Map<String, Value> {
    let mut defaults = Map::new();
    defaults.insert("topk".into(), Value::from(0u64));
    defaults
}

/// Builds [`MetricStore`]s. Holds no state and registers nothing; the caller
/// owns the association between metric name and store.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreFactory;

impl StoreFactory {
    pub fn new() -> Self {
        Self
    }

    /// Strict: `settings` must carry a valid `topk`.
    pub fn create(&self, metric_name: &str, settings: &Value) -> Result<MetricStore> {
        let settings = MetricSettings::from_value(settings).map_err(|e| {
            tracing::warn!(metric = %metric_name, error = %e, "rejected store settings");
            e
        })?;
        tracing::debug!(metric = %metric_name, topk = settings.topk, "metric store created");
        Ok(MetricStore::new(settings))
    }

    /// Merge [`default_metric_settings`] under `settings`, then validate.
    /// An unset `topk` becomes `0`.
    pub fn create_with_defaults(&self, metric_name: &str, settings: &Value) -> Result<MetricStore> {
        let mut merged = default_metric_settings();
        match settings {
            Value::Object(obj) => {
                for (k, v) in obj {
                    merged.insert(k.clone(), v.clone());
                }
            }
            Value::Null => {}
            _ => {
                return Err(LabelStoreError::InvalidStoreSettings(
                    "settings must be an object".into(),
                ))
            }
        }
        self.create(metric_name, &Value::Object(merged))
    }
}
