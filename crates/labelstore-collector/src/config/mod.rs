//! Collector config loader (strict parsing).

pub mod schema;

use std::fs;

use labelstore_core::error::{LabelStoreError, Result};

pub use schema::{CollectorConfig, CollectorSection, MetricConfig};

pub fn load_from_file(path: &str) -> Result<CollectorConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| LabelStoreError::Internal(format!("read config failed ({path}): {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<CollectorConfig> {
    let cfg: CollectorConfig = serde_yaml::from_str(s)
        .map_err(|e| LabelStoreError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
