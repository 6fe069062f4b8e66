//! labelstore collector library entry.
//!
//! Wires config, the metric registry, retention/reset timers, and the HTTP
//! surface (ingest + exposition) around the `labelstore-core` stores. Consumed
//! by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod exposition;
pub mod ingest;
pub mod metric;
pub mod ops;
pub mod registry;
pub mod retention;
pub mod router;
pub mod scheduler;
