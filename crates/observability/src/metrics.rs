//! Synced-stream metrics collection and aggregation.

use contracts::{SensorChannel, SyncedMeasurement};

/// Record one emitted synced measurement.
///
/// Per-channel slot age (reference time minus slot timestamp) feeds the
/// alignment histograms; completeness is slots filled over channels known.
pub fn record_synced_measurement(synced: &SyncedMeasurement) {
    metrics::counter!("pipeline_synced_total").increment(1);

    for (channel, measurement) in &synced.slots {
        let age_ns = synced.timestamp_ns - measurement.timestamp_ns;
        metrics::histogram!("pipeline_slot_age_ns", "channel" => channel.as_str())
            .record(age_ns as f64);
    }

    let completeness = synced.slots.len() as f64 / SensorChannel::ALL.len() as f64;
    metrics::histogram!("pipeline_completeness_ratio").record(completeness);
}

/// Record a batch of discarded stale measurements.
pub fn record_stale_batch(count: usize) {
    metrics::counter!("pipeline_stale_total").increment(count as u64);
}

/// Running aggregate over the emitted stream, for end-of-run summaries.
#[derive(Debug, Default)]
pub struct EmissionStats {
    count: u64,
    first_ns: Option<i64>,
    last_ns: Option<i64>,
    min_interval_ns: Option<i64>,
    max_interval_ns: Option<i64>,
}

impl EmissionStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one emission into the aggregate.
    pub fn observe(&mut self, synced: &SyncedMeasurement) {
        let ts = synced.timestamp_ns;
        if let Some(last) = self.last_ns {
            let interval = ts - last;
            self.min_interval_ns = Some(self.min_interval_ns.map_or(interval, |m| m.min(interval)));
            self.max_interval_ns = Some(self.max_interval_ns.map_or(interval, |m| m.max(interval)));
        } else {
            self.first_ns = Some(ts);
        }
        self.last_ns = Some(ts);
        self.count += 1;
    }

    pub fn summary(&self) -> EmissionSummary {
        EmissionSummary {
            count: self.count,
            span_ns: match (self.first_ns, self.last_ns) {
                (Some(first), Some(last)) => last - first,
                _ => 0,
            },
            min_interval_ns: self.min_interval_ns,
            max_interval_ns: self.max_interval_ns,
        }
    }
}

/// Point-in-time summary of an emission aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmissionSummary {
    pub count: u64,
    pub span_ns: i64,
    pub min_interval_ns: Option<i64>,
    pub max_interval_ns: Option<i64>,
}
