//! Measurement syncer: lifecycle, join engine and listener dispatch.

use std::sync::{Arc, Mutex, MutexGuard};

use contracts::{
    monotonic_timestamp_ns, AccuracyChangedCallback, MeasurementCallback, MeasurementCollector,
    SensorAccuracy, SensorChannel, SensorMeasurement, SyncError, SyncedMeasurement, SyncerConfig,
};
use tracing::{debug, instrument, trace, warn};

use crate::join;
use crate::state::{ChannelState, SyncerStats};

/// Listener invoked once per emitted synced measurement.
///
/// The aggregate reference is only valid for the duration of the call; clone
/// it to keep data across calls.
pub type SyncedMeasurementCallback = Arc<dyn Fn(&SyncedMeasurement) + Send + Sync>;

/// Listener invoked with each batch of discarded stale measurements.
pub type StaleMeasurementsCallback = Arc<dyn Fn(&[SensorMeasurement]) + Send + Sync>;

/// Listener invoked when a channel buffer overflows and the session stops.
pub type BufferFilledCallback = Arc<dyn Fn(SensorChannel) + Send + Sync>;

/// Replaceable listener handles, guarded by the syncer-wide exclusion so a
/// listener is never invoked mid-replacement.
#[derive(Default)]
struct Listeners {
    synced: Option<SyncedMeasurementCallback>,
    buffer_filled: Option<BufferFilledCallback>,
    stale: Option<StaleMeasurementsCallback>,
    accuracy: Option<AccuracyChangedCallback>,
}

/// Everything mutated by callbacks, lifecycle calls and introspection.
struct Inner {
    collectors: Vec<Box<dyn MeasurementCollector>>,
    channels: Vec<ChannelState>,
    stats: SyncerStats,
    listeners: Listeners,
    /// Reusable output aggregate; handed to the synced listener by reference
    scratch: SyncedMeasurement,
    /// Reusable stale batch
    stale_scratch: Vec<SensorMeasurement>,
}

/// Multi-channel measurement synchronizer.
///
/// Buffers per-channel samples, joins them at each primary-channel timestamp
/// with sample-and-hold values from the secondaries, and emits a time-ordered
/// stream of [`SyncedMeasurement`]s. Output reference timestamps are strictly
/// increasing and each equals some primary measurement's timestamp exactly.
///
/// One syncer-wide mutex serializes collector callbacks, `start`/`stop` and
/// introspection; the join runs synchronously inside the delivering callback,
/// so dispatch order is deterministic with respect to primary arrival order.
/// Listeners are invoked while that exclusion is held and must not call back
/// into the syncer.
pub struct MeasurementSyncer {
    config: Arc<SyncerConfig>,
    inner: Arc<Mutex<Inner>>,
}

impl std::fmt::Debug for MeasurementSyncer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeasurementSyncer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl MeasurementSyncer {
    /// Create a syncer over the given configuration and one collector per
    /// configured channel (any order).
    ///
    /// Fails fast on invalid configuration or a collector/channel mismatch.
    pub fn new(
        config: SyncerConfig,
        collectors: Vec<Box<dyn MeasurementCollector>>,
    ) -> Result<Self, SyncError> {
        config.validate()?;
        let collectors = Self::order_collectors(&config, collectors)?;
        let channels: Vec<ChannelState> = config.channels().map(ChannelState::new).collect();

        let config = Arc::new(config);
        let inner = Arc::new(Mutex::new(Inner {
            collectors,
            channels,
            stats: SyncerStats::new(),
            listeners: Listeners::default(),
            scratch: SyncedMeasurement::default(),
            stale_scratch: Vec::new(),
        }));

        let syncer = Self { config, inner };
        syncer.wire_callbacks();
        Ok(syncer)
    }

    /// Reorder collectors into declared channel order, primary first.
    fn order_collectors(
        config: &SyncerConfig,
        mut collectors: Vec<Box<dyn MeasurementCollector>>,
    ) -> Result<Vec<Box<dyn MeasurementCollector>>, SyncError> {
        let mut ordered = Vec::with_capacity(collectors.len());
        for channel_config in config.channels() {
            let channel = channel_config.channel;
            let pos = collectors
                .iter()
                .position(|c| c.channel() == channel)
                .ok_or_else(|| {
                    SyncError::config_validation(
                        format!("collectors.{channel}"),
                        "no collector provided for configured channel",
                    )
                })?;
            ordered.push(collectors.swap_remove(pos));
        }
        if let Some(extra) = collectors.first() {
            return Err(SyncError::config_validation(
                format!("collectors.{}", extra.channel()),
                "collector does not match any configured channel",
            ));
        }
        Ok(ordered)
    }

    /// Register delivery callbacks with every collector.
    fn wire_callbacks(&self) {
        let guard = self.lock();
        for (idx, collector) in guard.collectors.iter().enumerate() {
            let m_inner = Arc::clone(&self.inner);
            let m_config = Arc::clone(&self.config);
            let measurements: MeasurementCallback = Arc::new(move |measurement| {
                Self::on_measurement(&m_inner, &m_config, idx, measurement);
            });

            let a_inner = Arc::clone(&self.inner);
            let accuracy: AccuracyChangedCallback = Arc::new(move |channel, value| {
                Self::on_accuracy(&a_inner, channel, value);
            });

            collector.listen(measurements, accuracy);
        }
    }

    /// Start hardware delivery on every channel, in declared order (primary
    /// first), and transition to Running.
    ///
    /// `timestamp` is the session start passed to each collector for
    /// start-offset computation; when omitted, a fresh monotonic reading is
    /// used.
    ///
    /// On a collector failure the syncer stays Stopped and the call returns
    /// [`SyncError::CollectorStart`]; collectors started before the failing
    /// one are left running unless `rollback_on_start_failure` is set.
    #[instrument(name = "syncer_start", skip(self))]
    pub fn start(&self, timestamp: Option<i64>) -> Result<(), SyncError> {
        let mut guard = self.lock();
        let inner = &mut *guard;
        if inner.stats.running {
            return Err(SyncError::AlreadyRunning);
        }

        let start_ns = timestamp.unwrap_or_else(monotonic_timestamp_ns);
        inner.stats.start_timestamp_ns = start_ns;

        for idx in 0..inner.collectors.len() {
            if !inner.collectors[idx].start(start_ns) {
                let channel = inner.collectors[idx].channel();
                warn!(%channel, "collector failed to start");
                if self.config.rollback_on_start_failure {
                    for started in &inner.collectors[..idx] {
                        started.stop();
                    }
                }
                return Err(SyncError::collector_start(channel));
            }
        }

        inner.stats.running = true;
        debug!(
            start_timestamp_ns = start_ns,
            channels = inner.collectors.len(),
            "syncer running"
        );
        Ok(())
    }

    /// Stop every collector and restore post-construction state.
    ///
    /// Always permitted and idempotent; collector teardown is best-effort.
    #[instrument(name = "syncer_stop", skip(self))]
    pub fn stop(&self) {
        let mut guard = self.lock();
        Self::halt_locked(&mut guard);
    }

    // ===== Listener management =====

    /// Replace the synced-measurement listener. `None` clears it.
    pub fn set_synced_listener(&self, listener: Option<SyncedMeasurementCallback>) {
        self.lock().listeners.synced = listener;
    }

    /// Replace the buffer-filled listener. `None` clears it.
    pub fn set_buffer_filled_listener(&self, listener: Option<BufferFilledCallback>) {
        self.lock().listeners.buffer_filled = listener;
    }

    /// Replace the stale-detected listener. `None` clears it.
    pub fn set_stale_listener(&self, listener: Option<StaleMeasurementsCallback>) {
        self.lock().listeners.stale = listener;
    }

    /// Replace the accuracy-changed listener. `None` clears it.
    pub fn set_accuracy_listener(&self, listener: Option<AccuracyChangedCallback>) {
        self.lock().listeners.accuracy = listener;
    }

    // ===== Introspection =====

    pub fn is_running(&self) -> bool {
        self.lock().stats.running
    }

    /// Session start timestamp; keeps its last value across stop().
    pub fn start_timestamp_ns(&self) -> i64 {
        self.lock().stats.start_timestamp_ns
    }

    pub fn number_of_processed_measurements(&self) -> u64 {
        self.lock().stats.processed
    }

    /// Most recent timestamp accepted into any buffer since start.
    pub fn most_recent_timestamp_ns(&self) -> Option<i64> {
        self.lock().stats.most_recent_ns
    }

    /// Oldest first-arrival timestamp across channels since start.
    pub fn oldest_timestamp_ns(&self) -> Option<i64> {
        self.lock().stats.oldest_ns
    }

    /// Buffered-count divided by capacity for the given channel.
    pub fn buffer_usage(&self, channel: SensorChannel) -> Option<f64> {
        let guard = self.lock();
        guard
            .channels
            .iter()
            .find(|s| s.channel == channel)
            .map(|s| s.buffer.usage())
    }

    pub fn sensor_available(&self, channel: SensorChannel) -> Option<bool> {
        self.with_collector(channel, |c| c.sensor_available())
    }

    /// The channel collector's start offset, when tracked and known.
    pub fn collector_start_offset_ns(&self, channel: SensorChannel) -> Option<i64> {
        self.with_collector(channel, |c| c.start_offset_ns()).flatten()
    }

    /// The channel collector's delivery-side usage ratio.
    pub fn collector_usage(&self, channel: SensorChannel) -> Option<f64> {
        self.with_collector(channel, |c| c.usage())
    }

    pub fn config(&self) -> &SyncerConfig {
        &self.config
    }

    fn with_collector<T>(
        &self,
        channel: SensorChannel,
        f: impl FnOnce(&dyn MeasurementCollector) -> T,
    ) -> Option<T> {
        let guard = self.lock();
        guard
            .collectors
            .iter()
            .find(|c| c.channel() == channel)
            .map(|c| f(c.as_ref()))
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_shared(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
        inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // ===== Delivery path =====

    /// Single entry point for every hardware sample: push, stale purge, join.
    fn on_measurement(
        inner: &Mutex<Inner>,
        config: &SyncerConfig,
        idx: usize,
        measurement: SensorMeasurement,
    ) {
        let mut guard = Self::lock_shared(inner);
        let inner = &mut *guard;
        if !inner.stats.running {
            trace!(channel = %measurement.channel(), "measurement dropped while stopped");
            return;
        }

        let channel = inner.channels[idx].channel;
        let ts = measurement.timestamp_ns;

        if let Err(rejected) = inner.channels[idx].buffer.push(measurement) {
            if config.stop_when_filled_buffer {
                warn!(%channel, "buffer filled, stopping session");
                metrics::counter!("syncer_buffer_filled_total", "channel" => channel.as_str())
                    .increment(1);
                let listener = inner.listeners.buffer_filled.clone();
                if let Some(listener) = listener {
                    listener(channel);
                }
                Self::halt_locked(inner);
                return;
            }
            // Oldest-eviction keeps the session alive at bounded memory
            trace!(%channel, "buffer filled, evicting oldest");
            metrics::counter!("syncer_evictions_total", "channel" => channel.as_str()).increment(1);
            inner.channels[idx].buffer.pop();
            let _ = inner.channels[idx].buffer.push(rejected);
        }

        // Statistics update on acceptance only
        inner.stats.most_recent_ns = Some(inner.stats.most_recent_ns.map_or(ts, |cur| cur.max(ts)));
        if !inner.channels[idx].has_seen {
            inner.channels[idx].has_seen = true;
            inner.stats.oldest_ns = Some(inner.stats.oldest_ns.map_or(ts, |cur| cur.min(ts)));
        }
        metrics::gauge!("syncer_buffer_usage", "channel" => channel.as_str())
            .set(inner.channels[idx].buffer.usage());

        if config.stale_detection_enabled {
            Self::discard_stale_locked(inner, config.stale_offset_ns);
        }

        Self::process_measurements_locked(inner);
    }

    fn on_accuracy(inner: &Mutex<Inner>, channel: SensorChannel, accuracy: SensorAccuracy) {
        let guard = Self::lock_shared(inner);
        if !guard.stats.running {
            return;
        }
        trace!(%channel, ?accuracy, "accuracy changed");
        if let Some(listener) = guard.listeners.accuracy.clone() {
            listener(channel, accuracy);
        }
    }

    /// Drop every buffered measurement older than the freshness window and
    /// report the batch through the stale listener.
    fn discard_stale_locked(inner: &mut Inner, stale_offset_ns: i64) {
        let Some(most_recent) = inner.stats.most_recent_ns else {
            return;
        };
        let cutoff = most_recent.saturating_sub(stale_offset_ns);

        let mut batch = std::mem::take(&mut inner.stale_scratch);
        batch.clear();
        for state in &mut inner.channels {
            state.buffer.drain_stale(cutoff, &mut batch);
        }

        if !batch.is_empty() {
            trace!(
                discarded = batch.len(),
                cutoff_ns = cutoff,
                "stale measurements discarded"
            );
            metrics::counter!("syncer_stale_total").increment(batch.len() as u64);
            if let Some(listener) = inner.listeners.stale.clone() {
                listener(&batch);
            }
        }
        inner.stale_scratch = batch;
    }

    /// Drain the primary buffer, emitting one aggregate per primary
    /// measurement, until it runs dry or a secondary is inconclusive.
    fn process_measurements_locked(inner: &mut Inner) {
        let Inner {
            channels,
            stats,
            listeners,
            scratch,
            ..
        } = inner;

        loop {
            let Some(t) = channels[0].buffer.front_timestamp() else {
                break;
            };

            // An empty secondary buffer is inconclusive: a sample at or
            // before `t` may still be in flight. A non-empty buffer starting
            // after `t` cannot be, since per-channel delivery is in order.
            // Processing resumes on the next push.
            if channels[1..].iter().any(|s| s.buffer.is_empty()) {
                break;
            }

            let Some(primary) = channels[0].buffer.pop() else {
                break;
            };

            // Strict global monotonicity: a primary sample at or below the
            // last emitted reference can never be dispatched.
            if stats.processed > 0 && t <= stats.last_emitted_ns {
                trace!(timestamp_ns = t, "primary sample at or below watermark, dropped");
                continue;
            }

            scratch.reset();
            scratch.timestamp_ns = t;
            let primary_channel = channels[0].channel;
            channels[0].last_notified_ns = t;
            scratch.slots.insert(primary_channel, primary);

            for state in channels[1..].iter_mut() {
                let n = join::hold_prefix_len(state.buffer.timestamps(), t);
                if n > 0 {
                    if let Some(candidate) = state.buffer.consume_prefix(n) {
                        state.last_notified_ns = candidate.timestamp_ns;
                        state.held = Some(candidate);
                    }
                }
                // With no fresh candidate the slot re-uses the held value;
                // it stays absent until the channel first contributes.
                if let Some(held) = &state.held {
                    scratch.slots.insert(state.channel, held.clone());
                }
            }

            if stats.processed > 0 {
                metrics::histogram!("syncer_emit_interval_ns")
                    .record((t - stats.last_emitted_ns) as f64);
            }
            stats.last_emitted_ns = t;
            stats.processed += 1;
            metrics::counter!("syncer_synced_total").increment(1);
            trace!(
                timestamp_ns = t,
                slots = scratch.slots.len(),
                "synced measurement emitted"
            );

            if let Some(listener) = listeners.synced.clone() {
                listener(scratch);
            }
        }
    }

    /// Stop collectors and restore post-construction state; shared by
    /// explicit stop() and the overflow auto-stop.
    fn halt_locked(inner: &mut Inner) {
        for collector in &inner.collectors {
            collector.stop();
        }
        for state in &mut inner.channels {
            state.reset();
        }
        inner.stats.reset();
        inner.scratch.reset();
        inner.stale_scratch.clear();
    }
}
