//! # Collectors
//!
//! `MeasurementCollector` implementations that stand in for the OS sensor
//! registration layer:
//!
//! - [`SimulatedCollector`] generates plausible inertial data on a background
//!   thread at a configured rate, for development and demos without hardware
//! - [`ManualCollector`] delivers exactly the measurements a test feeds it,
//!   for deterministic join-engine tests

mod manual;
mod simulated;

pub use manual::ManualCollector;
pub use simulated::{SimulatedCollector, SimulatedCollectorConfig};
