//! labelstore core: label sets, the per-metric value store, and the store factory.
//!
//! This crate holds the concurrency-critical part of the collector: one
//! mutex-guarded `labels -> f64` map per metric, with top-K projection at read
//! time. It carries no runtime, transport, or clock dependencies; retention and
//! reset timers live in the collector and call into [`MetricStore`].
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! The only fallible path is settings validation, which surfaces as
//! `LabelStoreError::InvalidStoreSettings`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod factory;
pub mod labels;
pub mod store;

/// Shared result type.
pub use error::{LabelStoreError, Result};
pub use factory::{MetricSettings, StoreFactory};
pub use labels::{LabelSet, LabelValue};
pub use store::{MetricStore, Snapshot};
