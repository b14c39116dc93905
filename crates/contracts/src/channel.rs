//! Sensor channel identities and hardware-facing enums.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical sensor stream identity.
///
/// A channel names one hardware stream; its tuning (capacity, variant, delay)
/// lives in [`crate::ChannelConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorChannel {
    Accelerometer,
    Gravity,
    Gyroscope,
    Attitude,
    Magnetometer,
}

impl SensorChannel {
    /// All known channels, in declaration order.
    pub const ALL: [SensorChannel; 5] = [
        SensorChannel::Accelerometer,
        SensorChannel::Gravity,
        SensorChannel::Gyroscope,
        SensorChannel::Attitude,
        SensorChannel::Magnetometer,
    ];

    /// Stable lowercase name, also used as a metrics label.
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorChannel::Accelerometer => "accelerometer",
            SensorChannel::Gravity => "gravity",
            SensorChannel::Gyroscope => "gyroscope",
            SensorChannel::Attitude => "attitude",
            SensorChannel::Magnetometer => "magnetometer",
        }
    }

    /// Whether the channel has an uncalibrated hardware variant.
    ///
    /// Gravity and attitude are derived streams; the hardware only reports
    /// them calibrated.
    pub fn has_uncalibrated_variant(&self) -> bool {
        matches!(
            self,
            SensorChannel::Accelerometer | SensorChannel::Gyroscope | SensorChannel::Magnetometer
        )
    }
}

impl fmt::Display for SensorChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sensor variant selection.
///
/// Uncalibrated variants expose the raw hardware reading together with the
/// estimated bias/offset; calibrated variants deliver the reading with the
/// bias already applied and carry no bias field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorVariant {
    #[default]
    Calibrated,
    Uncalibrated,
}

/// Requested hardware delivery rate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorDelay {
    /// As fast as the hardware can deliver
    #[default]
    Fastest,
    /// Suitable for games (~50 Hz)
    Game,
    /// Suitable for UI updates (~16 Hz)
    Ui,
    /// Default OS rate (~5 Hz)
    Normal,
}

/// Hardware-reported accuracy classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorAccuracy {
    Unreliable,
    Low,
    Medium,
    High,
}
