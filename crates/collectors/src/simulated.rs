//! Simulated collector.
//!
//! Generates plausible inertial data at a configured rate on a background
//! thread, hands it through a bounded queue to a dispatch thread, and invokes
//! the registered callback there. Behaves like a hardware driver as seen
//! through the collector contract: asynchronous delivery, delivery-side queue
//! usage, start-offset tracking.

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::mpsc::{sync_channel, TrySendError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use contracts::{
    monotonic_timestamp_ns, AccuracyChangedCallback, MeasurementCallback, MeasurementCollector,
    MeasurementData, Quaternion, SensorAccuracy, SensorChannel, SensorDelay, SensorMeasurement,
    SensorVariant, Vector3,
};
use rand::Rng;
use tracing::{debug, trace};

/// Simulated collector configuration.
#[derive(Debug, Clone)]
pub struct SimulatedCollectorConfig {
    /// Delivery rate (Hz)
    pub frequency_hz: f64,
    /// Timing jitter as a fraction of the nominal period (0.0 = none)
    pub jitter: f64,
    /// Delivery-side queue bound; `usage()` reports its fill ratio
    pub queue_capacity: usize,
    /// Track the offset between start and the first delivery
    pub start_offset_enabled: bool,
    /// Accuracy reported once after start
    pub accuracy: SensorAccuracy,
}

impl Default for SimulatedCollectorConfig {
    fn default() -> Self {
        Self {
            frequency_hz: 50.0,
            jitter: 0.1,
            queue_capacity: 64,
            start_offset_enabled: true,
            accuracy: SensorAccuracy::High,
        }
    }
}

impl SimulatedCollectorConfig {
    /// Map a delay preference onto a nominal delivery rate.
    pub fn with_delay(mut self, delay: SensorDelay) -> Self {
        self.frequency_hz = match delay {
            SensorDelay::Fastest => 100.0,
            SensorDelay::Game => 50.0,
            SensorDelay::Ui => 16.0,
            SensorDelay::Normal => 5.0,
        };
        self
    }
}

struct SimulatedShared {
    available: AtomicBool,
    listening: AtomicBool,
    queue_len: AtomicUsize,
    reference_ns: AtomicI64,
    start_offset_ns: AtomicI64,
    offset_known: AtomicBool,
    callbacks: Mutex<Option<(MeasurementCallback, AccuracyChangedCallback)>>,
}

/// Thread-driven simulated sensor.
pub struct SimulatedCollector {
    channel: SensorChannel,
    variant: SensorVariant,
    config: SimulatedCollectorConfig,
    shared: Arc<SimulatedShared>,
}

impl SimulatedCollector {
    pub fn new(
        channel: SensorChannel,
        variant: SensorVariant,
        config: SimulatedCollectorConfig,
    ) -> Self {
        Self {
            channel,
            variant,
            config,
            shared: Arc::new(SimulatedShared {
                available: AtomicBool::new(true),
                listening: AtomicBool::new(false),
                queue_len: AtomicUsize::new(0),
                reference_ns: AtomicI64::new(0),
                start_offset_ns: AtomicI64::new(0),
                offset_known: AtomicBool::new(false),
                callbacks: Mutex::new(None),
            }),
        }
    }

    /// Calibrated collector with default tuning.
    pub fn with_defaults(channel: SensorChannel) -> Self {
        Self::new(
            channel,
            SensorVariant::Calibrated,
            SimulatedCollectorConfig::default(),
        )
    }

    /// Control what `sensor_available` reports (simulates a missing sensor).
    pub fn set_available(&self, available: bool) {
        self.shared.available.store(available, Ordering::SeqCst);
    }

    /// Generate one payload for the given channel.
    fn generate(
        channel: SensorChannel,
        variant: SensorVariant,
        rng: &mut impl Rng,
        elapsed_s: f64,
    ) -> MeasurementData {
        let uncalibrated = variant == SensorVariant::Uncalibrated;
        let mut noise = |scale: f64| rng.random_range(-scale..scale);

        match channel {
            SensorChannel::Accelerometer => MeasurementData::Accelerometer {
                specific_force: Vector3::new(noise(0.05), noise(0.05), 9.81 + noise(0.05)),
                bias: uncalibrated.then(|| Vector3::new(0.02, -0.01, 0.03)),
            },
            SensorChannel::Gravity => MeasurementData::Gravity {
                gravity: Vector3::new(noise(0.005), noise(0.005), 9.81 + noise(0.005)),
            },
            SensorChannel::Gyroscope => MeasurementData::Gyroscope {
                angular_rate: Vector3::new(noise(0.01), noise(0.01), 0.2 + noise(0.01)),
                bias: uncalibrated.then(|| Vector3::new(0.001, 0.002, -0.001)),
            },
            SensorChannel::Attitude => {
                // Slow yaw rotation at 0.2 rad/s
                let half_yaw = 0.1 * elapsed_s;
                MeasurementData::Attitude {
                    rotation: Quaternion {
                        a: half_yaw.cos(),
                        b: 0.0,
                        c: 0.0,
                        d: half_yaw.sin(),
                    },
                }
            }
            SensorChannel::Magnetometer => MeasurementData::Magnetometer {
                field: Vector3::new(22.0 + noise(0.5), 5.4 + noise(0.5), -42.0 + noise(0.5)),
                hard_iron: uncalibrated.then(|| Vector3::new(1.2, -0.8, 0.4)),
            },
        }
    }
}

impl MeasurementCollector for SimulatedCollector {
    fn channel(&self) -> SensorChannel {
        self.channel
    }

    fn sensor_available(&self) -> bool {
        self.shared.available.load(Ordering::SeqCst)
    }

    fn listen(&self, measurements: MeasurementCallback, accuracy: AccuracyChangedCallback) {
        let mut guard = self
            .shared
            .callbacks
            .lock()
            .unwrap_or_else(|p| p.into_inner());
        if guard.is_none() {
            *guard = Some((measurements, accuracy));
        }
    }

    fn start(&self, reference_timestamp_ns: i64) -> bool {
        if !self.sensor_available() {
            return false;
        }
        // Idempotent: already delivering
        if self.shared.listening.swap(true, Ordering::SeqCst) {
            return true;
        }

        self.shared
            .reference_ns
            .store(reference_timestamp_ns, Ordering::SeqCst);
        self.shared.offset_known.store(false, Ordering::SeqCst);
        self.shared.queue_len.store(0, Ordering::SeqCst);

        let channel = self.channel;
        let variant = self.variant;
        let config = self.config.clone();
        let (tx, rx) = sync_channel::<SensorMeasurement>(config.queue_capacity);

        // Generator thread: hardware timing
        {
            let shared = self.shared.clone();
            let config = config.clone();
            thread::spawn(move || {
                let mut rng = rand::rng();
                let period = Duration::from_secs_f64(1.0 / config.frequency_hz);
                let start = std::time::Instant::now();

                debug!(%channel, frequency_hz = config.frequency_hz, "simulated sensor started");

                while shared.listening.load(Ordering::Relaxed) {
                    let elapsed_s = start.elapsed().as_secs_f64();
                    let data =
                        SimulatedCollector::generate(channel, variant, &mut rng, elapsed_s);
                    let mut measurement =
                        SensorMeasurement::new(monotonic_timestamp_ns(), variant, data);
                    measurement.accuracy = Some(config.accuracy);

                    match tx.try_send(measurement) {
                        Ok(()) => {
                            shared.queue_len.fetch_add(1, Ordering::Relaxed);
                        }
                        Err(TrySendError::Full(_)) => {
                            // Hardware-side overrun: the reading is lost
                            trace!(%channel, "delivery queue full, sample dropped");
                        }
                        Err(TrySendError::Disconnected(_)) => break,
                    }

                    let jitter = if config.jitter > 0.0 {
                        1.0 + rng.random_range(-config.jitter..config.jitter)
                    } else {
                        1.0
                    };
                    thread::sleep(period.mul_f64(jitter));
                }

                debug!(%channel, "simulated sensor stopped");
            });
        }

        // Dispatch thread: callback context
        {
            let shared = self.shared.clone();
            thread::spawn(move || {
                let accuracy_callback = {
                    let guard = shared.callbacks.lock().unwrap_or_else(|p| p.into_inner());
                    guard.as_ref().map(|(_, accuracy)| accuracy.clone())
                };
                if let Some(accuracy_callback) = accuracy_callback {
                    accuracy_callback(channel, config.accuracy);
                }

                while let Ok(measurement) = rx.recv() {
                    // Saturating: a restart may have reset the counter while
                    // this dispatcher was still draining the old queue
                    let _ = shared.queue_len.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |len| {
                        Some(len.saturating_sub(1))
                    });

                    if config.start_offset_enabled
                        && !shared.offset_known.swap(true, Ordering::SeqCst)
                    {
                        let offset = measurement.timestamp_ns
                            - shared.reference_ns.load(Ordering::SeqCst);
                        shared.start_offset_ns.store(offset, Ordering::SeqCst);
                    }

                    let callback = {
                        let guard = shared.callbacks.lock().unwrap_or_else(|p| p.into_inner());
                        guard.as_ref().map(|(measurements, _)| measurements.clone())
                    };
                    if let Some(callback) = callback {
                        callback(measurement);
                    }
                }
            });
        }

        true
    }

    fn stop(&self) {
        self.shared.listening.store(false, Ordering::SeqCst);
        self.shared.offset_known.store(false, Ordering::SeqCst);
        self.shared.start_offset_ns.store(0, Ordering::SeqCst);
    }

    fn start_offset_ns(&self) -> Option<i64> {
        if self.config.start_offset_enabled && self.shared.offset_known.load(Ordering::SeqCst) {
            Some(self.shared.start_offset_ns.load(Ordering::SeqCst))
        } else {
            None
        }
    }

    fn usage(&self) -> f64 {
        let len = self.shared.queue_len.load(Ordering::Relaxed);
        (len as f64 / self.config.queue_capacity as f64).clamp(0.0, 1.0)
    }
}
