//! SyncedMeasurement - Syncer output
//!
//! Jointly-consistent multi-channel aggregate at one reference timestamp.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{SensorChannel, SensorMeasurement};

/// Synced measurement aggregate.
///
/// Holds, per configured channel, the measurement chosen for the reference
/// timestamp; an absent key means the channel has not contributed yet.
/// Secondary slots are never guaranteed present.
///
/// The syncer owns one instance and reuses it across dispatches: listeners
/// receive `&SyncedMeasurement` and must `clone` if they keep data across
/// calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncedMeasurement {
    /// Reference timestamp (monotonic nanoseconds)
    pub timestamp_ns: i64,

    /// Chosen measurement per channel
    pub slots: HashMap<SensorChannel, SensorMeasurement>,
}

impl SyncedMeasurement {
    /// Measurement chosen for `channel`, if any.
    pub fn slot(&self, channel: SensorChannel) -> Option<&SensorMeasurement> {
        self.slots.get(&channel)
    }

    /// Clear all slots and the reference timestamp, keeping allocations.
    pub fn reset(&mut self) {
        self.timestamp_ns = 0;
        self.slots.clear();
    }
}
