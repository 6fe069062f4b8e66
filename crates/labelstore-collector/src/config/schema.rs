use std::collections::HashSet;
use std::net::SocketAddr;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use labelstore_core::error::{LabelStoreError, Result};

use crate::metric::{MetricKind, MetricTimers};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectorConfig {
    pub version: u32,

    #[serde(default)]
    pub collector: CollectorSection,

    #[serde(default)]
    pub metrics: Vec<MetricConfig>,
}

impl CollectorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(LabelStoreError::UnsupportedVersion);
        }
        if self.metrics.is_empty() {
            return Err(LabelStoreError::BadRequest("metrics must not be empty".into()));
        }

        self.collector.validate()?;

        let mut seen = HashSet::new();
        for m in &self.metrics {
            m.validate()?;
            if !seen.insert(m.name.as_str()) {
                return Err(LabelStoreError::DuplicateMetric(m.name.clone()));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectorSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for CollectorSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl CollectorSection {
    pub fn validate(&self) -> Result<()> {
        self.listen.parse::<SocketAddr>().map_err(|e| {
            LabelStoreError::BadRequest(format!("collector.listen is not a socket address: {e}"))
        })?;
        Ok(())
    }
}

fn default_listen() -> String {
    "0.0.0.0:24231".into()
}

/// One metric definition. `topk` is left untyped; the store factory fills
/// in its default and validates it when the metric is registered.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricConfig {
    pub name: String,

    #[serde(rename = "type")]
    pub kind: MetricKind,

    #[serde(default)]
    pub desc: String,

    /// Unset (or `~`) defaults to `0`.
    #[serde(default)]
    pub topk: Option<Value>,

    /// Seconds a label set may go unobserved before it is removed.
    #[serde(default)]
    pub retention: Option<u64>,

    #[serde(default = "default_retention_check_interval")]
    pub retention_check_interval: u64,

    /// Seconds between full resets to zero.
    #[serde(default)]
    pub reset_after: Option<u64>,
}

impl MetricConfig {
    pub fn validate(&self) -> Result<()> {
        if !is_valid_metric_name(&self.name) {
            return Err(LabelStoreError::BadRequest(format!(
                "invalid metric name: {:?}",
                self.name
            )));
        }
        if self.retention == Some(0) {
            return Err(LabelStoreError::BadRequest(format!(
                "metric {}: retention must be greater than 0",
                self.name
            )));
        }
        if self.retention_check_interval == 0 {
            return Err(LabelStoreError::BadRequest(format!(
                "metric {}: retention_check_interval must be greater than 0",
                self.name
            )));
        }
        if self.reset_after == Some(0) {
            return Err(LabelStoreError::BadRequest(format!(
                "metric {}: reset_after must be greater than 0",
                self.name
            )));
        }
        Ok(())
    }

    /// Settings object handed to the store factory. Omits unset keys.
    pub fn store_settings(&self) -> Value {
        let mut settings = serde_json::Map::new();
        if let Some(topk) = &self.topk {
            settings.insert("topk".into(), topk.clone());
        }
        Value::Object(settings)
    }

    pub fn timers(&self) -> MetricTimers {
        MetricTimers {
            retention: self.retention.map(Duration::from_secs),
            retention_check_interval: Duration::from_secs(self.retention_check_interval),
            reset_after: self.reset_after.map(Duration::from_secs),
        }
    }
}

fn default_retention_check_interval() -> u64 {
    60
}

/// `[a-zA-Z_:][a-zA-Z0-9_:]*`
fn is_valid_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}
