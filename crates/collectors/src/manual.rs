//! Manual collector for deterministic tests.
//!
//! Delivers exactly the measurements fed through [`ManualCollector::emit`],
//! on the caller's thread, with configurable availability and start outcome.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use contracts::{
    AccuracyChangedCallback, MeasurementCallback, MeasurementCollector, SensorAccuracy,
    SensorChannel, SensorMeasurement,
};

struct ManualShared {
    channel: SensorChannel,
    available: AtomicBool,
    start_result: AtomicBool,
    started: AtomicBool,
    reference_ns: AtomicI64,
    start_offset_ns: AtomicI64,
    offset_known: AtomicBool,
    callbacks: Mutex<Option<(MeasurementCallback, AccuracyChangedCallback)>>,
}

/// Hand-driven collector.
///
/// Cloning yields another handle to the same collector, so a test can keep
/// one handle for feeding while the syncer owns the boxed trait object.
#[derive(Clone)]
pub struct ManualCollector {
    shared: Arc<ManualShared>,
}

impl ManualCollector {
    pub fn new(channel: SensorChannel) -> Self {
        Self {
            shared: Arc::new(ManualShared {
                channel,
                available: AtomicBool::new(true),
                start_result: AtomicBool::new(true),
                started: AtomicBool::new(false),
                reference_ns: AtomicI64::new(0),
                start_offset_ns: AtomicI64::new(0),
                offset_known: AtomicBool::new(false),
                callbacks: Mutex::new(None),
            }),
        }
    }

    /// Control what `sensor_available` reports.
    pub fn set_available(&self, available: bool) {
        self.shared.available.store(available, Ordering::SeqCst);
    }

    /// Control what the next `start` calls return.
    pub fn set_start_result(&self, succeed: bool) {
        self.shared.start_result.store(succeed, Ordering::SeqCst);
    }

    pub fn is_started(&self) -> bool {
        self.shared.started.load(Ordering::SeqCst)
    }

    /// Deliver a measurement as if the hardware produced it.
    ///
    /// Ignored while the collector is not started, like a real driver whose
    /// listener is unregistered.
    pub fn emit(&self, measurement: SensorMeasurement) {
        if !self.shared.started.load(Ordering::SeqCst) {
            return;
        }
        if !self.shared.offset_known.swap(true, Ordering::SeqCst) {
            let offset = measurement.timestamp_ns - self.shared.reference_ns.load(Ordering::SeqCst);
            self.shared.start_offset_ns.store(offset, Ordering::SeqCst);
        }
        let callback = {
            let guard = self.shared.callbacks.lock().unwrap_or_else(|p| p.into_inner());
            guard.as_ref().map(|(measurements, _)| measurements.clone())
        };
        if let Some(callback) = callback {
            callback(measurement);
        }
    }

    /// Deliver an accuracy change.
    pub fn emit_accuracy(&self, accuracy: SensorAccuracy) {
        if !self.shared.started.load(Ordering::SeqCst) {
            return;
        }
        let callback = {
            let guard = self.shared.callbacks.lock().unwrap_or_else(|p| p.into_inner());
            guard.as_ref().map(|(_, accuracy)| accuracy.clone())
        };
        if let Some(callback) = callback {
            callback(self.shared.channel, accuracy);
        }
    }
}

impl MeasurementCollector for ManualCollector {
    fn channel(&self) -> SensorChannel {
        self.shared.channel
    }

    fn sensor_available(&self) -> bool {
        self.shared.available.load(Ordering::SeqCst)
    }

    fn listen(&self, measurements: MeasurementCallback, accuracy: AccuracyChangedCallback) {
        let mut guard = self.shared.callbacks.lock().unwrap_or_else(|p| p.into_inner());
        if guard.is_none() {
            *guard = Some((measurements, accuracy));
        }
    }

    fn start(&self, reference_timestamp_ns: i64) -> bool {
        if !self.sensor_available() || !self.shared.start_result.load(Ordering::SeqCst) {
            return false;
        }
        self.shared
            .reference_ns
            .store(reference_timestamp_ns, Ordering::SeqCst);
        self.shared.offset_known.store(false, Ordering::SeqCst);
        self.shared.started.store(true, Ordering::SeqCst);
        true
    }

    fn stop(&self) {
        self.shared.started.store(false, Ordering::SeqCst);
        self.shared.offset_known.store(false, Ordering::SeqCst);
        self.shared.start_offset_ns.store(0, Ordering::SeqCst);
    }

    fn start_offset_ns(&self) -> Option<i64> {
        if self.shared.offset_known.load(Ordering::SeqCst) {
            Some(self.shared.start_offset_ns.load(Ordering::SeqCst))
        } else {
            None
        }
    }

    fn usage(&self) -> f64 {
        // Direct dispatch, no delivery-side queue
        0.0
    }
}
