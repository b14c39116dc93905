//! Syncer configuration contracts that can be shared across crates.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::{SensorChannel, SensorDelay, SensorVariant, SyncError};

/// Default per-channel buffer capacity.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 100;

/// Default freshness window for stale detection (500 ms).
pub const DEFAULT_STALE_OFFSET_NANOS: i64 = 500_000_000;

/// Per-channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Channel identity
    pub channel: SensorChannel,

    /// Bound on buffered samples, must be positive
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Calibrated vs. uncalibrated hardware stream
    #[serde(default)]
    pub variant: SensorVariant,

    /// Requested hardware delivery rate
    #[serde(default)]
    pub delay: SensorDelay,

    /// Track the offset between session start and first delivery
    #[serde(default = "default_true")]
    pub start_offset_enabled: bool,
}

impl ChannelConfig {
    /// Channel configuration with default tuning.
    pub fn new(channel: SensorChannel) -> Self {
        Self {
            channel,
            capacity: DEFAULT_CHANNEL_CAPACITY,
            variant: SensorVariant::default(),
            delay: SensorDelay::default(),
            start_offset_enabled: true,
        }
    }

    /// Same channel with an explicit capacity.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Same channel with an explicit variant.
    pub fn with_variant(mut self, variant: SensorVariant) -> Self {
        self.variant = variant;
        self
    }
}

/// Measurement syncer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncerConfig {
    /// Primary channel (drives join attempts and output cadence)
    pub primary: ChannelConfig,

    /// Secondary channels contributing sample-and-hold values
    #[serde(default)]
    pub secondaries: Vec<ChannelConfig>,

    /// On overflow: stop the session (true) or evict the oldest sample (false)
    #[serde(default = "default_true")]
    pub stop_when_filled_buffer: bool,

    /// Freshness window relative to the most recent buffered timestamp
    #[serde(default = "default_stale_offset")]
    pub stale_offset_ns: i64,

    /// Discard and report measurements older than the freshness window
    #[serde(default = "default_true")]
    pub stale_detection_enabled: bool,

    /// Stop already-started collectors when a later collector fails to start
    #[serde(default)]
    pub rollback_on_start_failure: bool,
}

impl SyncerConfig {
    /// Configuration with the given primary channel and no secondaries.
    pub fn new(primary: ChannelConfig) -> Self {
        Self {
            primary,
            secondaries: Vec::new(),
            stop_when_filled_buffer: true,
            stale_offset_ns: DEFAULT_STALE_OFFSET_NANOS,
            stale_detection_enabled: true,
            rollback_on_start_failure: false,
        }
    }

    /// Append a secondary channel.
    pub fn with_secondary(mut self, secondary: ChannelConfig) -> Self {
        self.secondaries.push(secondary);
        self
    }

    /// Configured channels, primary first.
    pub fn channels(&self) -> impl Iterator<Item = &ChannelConfig> {
        std::iter::once(&self.primary).chain(self.secondaries.iter())
    }

    /// Fail-fast semantic validation.
    ///
    /// Returns the first error encountered, or `Ok(())`.
    pub fn validate(&self) -> Result<(), SyncError> {
        let mut seen = HashSet::new();
        for config in self.channels() {
            let name = config.channel.as_str();
            if config.capacity == 0 {
                return Err(SyncError::config_validation(
                    format!("channels.{name}.capacity"),
                    "capacity must be positive",
                ));
            }
            if config.variant == SensorVariant::Uncalibrated
                && !config.channel.has_uncalibrated_variant()
            {
                return Err(SyncError::config_validation(
                    format!("channels.{name}.variant"),
                    format!("channel '{name}' has no uncalibrated variant"),
                ));
            }
            if !seen.insert(config.channel) {
                return Err(SyncError::config_validation(
                    format!("channels.{name}"),
                    "duplicate channel",
                ));
            }
        }
        if self.stale_detection_enabled && self.stale_offset_ns <= 0 {
            return Err(SyncError::config_validation(
                "stale_offset_ns",
                format!(
                    "must be positive when stale detection is enabled, got {}",
                    self.stale_offset_ns
                ),
            ));
        }
        Ok(())
    }
}

impl Default for SyncerConfig {
    /// Accelerometer-driven configuration with gravity and gyroscope
    /// secondaries, the common inertial-navigation trio.
    fn default() -> Self {
        Self::new(ChannelConfig::new(SensorChannel::Accelerometer))
            .with_secondary(ChannelConfig::new(SensorChannel::Gravity))
            .with_secondary(ChannelConfig::new(SensorChannel::Gyroscope))
    }
}

fn default_capacity() -> usize {
    DEFAULT_CHANNEL_CAPACITY
}

fn default_stale_offset() -> i64 {
    DEFAULT_STALE_OFFSET_NANOS
}

fn default_true() -> bool {
    true
}
