//! Per-channel and syncer-wide mutable state.
//!
//! One explicit state struct per configured channel plus one global struct,
//! passed into the join engine as a unit rather than spread across loose
//! fields.

use contracts::{ChannelConfig, SensorChannel, SensorMeasurement};

use crate::buffer::ChannelBuffer;

/// Mutable state for one configured channel.
#[derive(Debug)]
pub(crate) struct ChannelState {
    pub channel: SensorChannel,
    pub buffer: ChannelBuffer,

    /// Set once the channel has produced a measurement since start
    pub has_seen: bool,

    /// Timestamp of the channel's latest contribution to an emitted aggregate
    pub last_notified_ns: i64,

    /// Last consumed candidate, re-used as the sample-and-hold slot when no
    /// fresher sample exists at join time
    pub held: Option<SensorMeasurement>,
}

impl ChannelState {
    pub fn new(config: &ChannelConfig) -> Self {
        Self {
            channel: config.channel,
            buffer: ChannelBuffer::new(config.capacity),
            has_seen: false,
            last_notified_ns: 0,
            held: None,
        }
    }

    /// Restore the post-construction state.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.has_seen = false;
        self.last_notified_ns = 0;
        self.held = None;
    }
}

/// Syncer-wide statistics and lifecycle flags.
#[derive(Debug, Default)]
pub(crate) struct SyncerStats {
    pub running: bool,

    /// Session start (explicit or clock-derived); survives stop()
    pub start_timestamp_ns: i64,

    /// Emitted SyncedMeasurement count
    pub processed: u64,

    /// Most recent timestamp accepted into any buffer
    pub most_recent_ns: Option<i64>,

    /// Oldest first-arrival timestamp across channels
    pub oldest_ns: Option<i64>,

    /// Global watermark: reference timestamp of the last dispatched aggregate
    pub last_emitted_ns: i64,
}

impl SyncerStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore the post-construction state. The start timestamp keeps its
    /// last value; it is neither a buffer, a flag, a watermark nor a counter.
    pub fn reset(&mut self) {
        self.running = false;
        self.processed = 0;
        self.most_recent_ns = None;
        self.oldest_ns = None;
        self.last_emitted_ns = 0;
    }
}
