//! # Syncer
//!
//! Multi-channel inertial measurement synchronizer.
//!
//! Responsibilities:
//! - Capacity-bounded per-channel buffering
//! - Sample-and-hold cross-channel time join, driven by the primary channel
//! - Stale-measurement detection and reporting
//! - Monotonic, non-duplicated `SyncedMeasurement` output
//!
//! ## Usage example
//!
//! ```ignore
//! use contracts::SyncerConfig;
//! use syncer::MeasurementSyncer;
//!
//! let syncer = MeasurementSyncer::new(SyncerConfig::default(), collectors)?;
//! syncer.set_synced_listener(Some(std::sync::Arc::new(|synced| {
//!     // Handle the aggregate; clone it to keep it across calls
//! })));
//! syncer.start(None)?;
//! // ... measurements flow from the collectors ...
//! syncer.stop();
//! ```

mod buffer;
mod join;
mod state;
mod syncer;

pub use crate::syncer::{
    BufferFilledCallback, MeasurementSyncer, StaleMeasurementsCallback, SyncedMeasurementCallback,
};

// Re-export contracts types
pub use contracts::{
    ChannelConfig, SensorChannel, SensorMeasurement, SyncError, SyncedMeasurement, SyncerConfig,
};
