//! Top-level facade crate for labelstore.
//!
//! Re-exports the store core and the collector library so users can depend on a single crate.

pub mod core {
    pub use labelstore_core::*;
}

pub mod collector {
    pub use labelstore_collector::*;
}
