//! MeasurementCollector trait - hardware collector abstraction
//!
//! Defines the narrow contract through which the syncer consumes a hardware
//! channel, decoupling it from OS sensor registration. Real drivers and
//! simulated sources implement the same interface.

use std::sync::Arc;

use crate::{SensorAccuracy, SensorChannel, SensorMeasurement};

/// Measurement delivery callback type.
///
/// Invoked once per hardware sample. Uses `Arc` so the callback can be shared
/// across delivery contexts.
pub type MeasurementCallback = Arc<dyn Fn(SensorMeasurement) + Send + Sync>;

/// Accuracy-change callback type.
pub type AccuracyChangedCallback = Arc<dyn Fn(SensorChannel, SensorAccuracy) + Send + Sync>;

/// Hardware channel collector.
///
/// One collector per configured channel. Measurements arrive through the
/// registered callback on a context the caller does not control, possibly
/// concurrently with other channels' callbacks.
///
/// # Contract notes
///
/// 1. **Decoupling**: data generation is separated from consumption; the
///    syncer never touches OS sensor APIs
/// 2. **Callback pattern**: delivery mirrors the platform's native listener
///    pattern rather than a polled queue
/// 3. `start` must not invoke the measurement callback synchronously on the
///    caller's thread, and `stop` must not block waiting for in-flight
///    callbacks; the syncer holds its own exclusion while calling both
///
/// # Example
///
/// ```ignore
/// let collector: Box<dyn MeasurementCollector> = build_collector();
/// collector.listen(
///     Arc::new(|m| println!("sample at {}", m.timestamp_ns)),
///     Arc::new(|channel, accuracy| println!("{channel}: {accuracy:?}")),
/// );
/// if collector.start(reference_timestamp_ns) {
///     // ... measurements flow ...
///     collector.stop();
/// }
/// ```
pub trait MeasurementCollector: Send + Sync {
    /// Channel this collector feeds.
    fn channel(&self) -> SensorChannel;

    /// Whether the underlying sensor is present on this device.
    fn sensor_available(&self) -> bool;

    /// Register delivery callbacks.
    ///
    /// Repeated calls are idempotent: the first registration wins until the
    /// collector is dropped.
    fn listen(&self, measurements: MeasurementCallback, accuracy: AccuracyChangedCallback);

    /// Register with the hardware and begin delivery.
    ///
    /// `reference_timestamp_ns` is the session start used for start-offset
    /// computation. Returns `false` when the sensor is unavailable or
    /// registration fails.
    fn start(&self, reference_timestamp_ns: i64) -> bool;

    /// Unregister and reset offset/counter state.
    fn stop(&self);

    /// Nanoseconds between the start call and the first delivered measurement.
    ///
    /// Present only when offset tracking is enabled and at least one
    /// measurement has arrived since start.
    fn start_offset_ns(&self) -> Option<i64>;

    /// Fraction of the collector's delivery-side capacity in use (0.0..=1.0).
    ///
    /// Independent of the syncer's own buffer usage.
    fn usage(&self) -> f64;
}
