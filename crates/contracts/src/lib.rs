//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Hardware timestamps are monotonic nanoseconds (`i64`) from an arbitrary epoch;
//!   only differences between readings are meaningful
//! - Delivery within one channel is in timestamp order; no ordering is assumed
//!   across channels

mod channel;
mod clock;
mod collector;
mod error;
mod measurement;
mod synced;
mod syncer_config;

pub use channel::*;
pub use clock::monotonic_timestamp_ns;
pub use collector::{AccuracyChangedCallback, MeasurementCallback, MeasurementCollector};
pub use error::*;
pub use measurement::*;
pub use synced::SyncedMeasurement;
pub use syncer_config::*;
