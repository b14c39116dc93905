//! SensorMeasurement - Collector output
//!
//! One timestamped reading on a sensor channel.

use serde::{Deserialize, Serialize};

use crate::{SensorAccuracy, SensorChannel, SensorVariant};

/// 3D vector in the sensor body frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Unit quaternion describing the attitude of the body frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl Quaternion {
    pub fn identity() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 0.0,
        }
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::identity()
    }
}

/// Channel-specific measured values.
///
/// Bias/offset components are present only for the uncalibrated variants;
/// calibrated readings carry `None`, never zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementData {
    /// Specific force (m/s²)
    Accelerometer {
        specific_force: Vector3,
        bias: Option<Vector3>,
    },

    /// Gravity direction and magnitude (m/s²)
    Gravity { gravity: Vector3 },

    /// Angular rate (rad/s)
    Gyroscope {
        angular_rate: Vector3,
        bias: Option<Vector3>,
    },

    /// Device attitude
    Attitude { rotation: Quaternion },

    /// Ambient magnetic field (µT)
    Magnetometer {
        field: Vector3,
        hard_iron: Option<Vector3>,
    },
}

impl MeasurementData {
    /// Channel this payload belongs to.
    pub fn channel(&self) -> SensorChannel {
        match self {
            MeasurementData::Accelerometer { .. } => SensorChannel::Accelerometer,
            MeasurementData::Gravity { .. } => SensorChannel::Gravity,
            MeasurementData::Gyroscope { .. } => SensorChannel::Gyroscope,
            MeasurementData::Attitude { .. } => SensorChannel::Attitude,
            MeasurementData::Magnetometer { .. } => SensorChannel::Magnetometer,
        }
    }
}

/// One reading on a sensor channel.
///
/// Measurements are value objects: `clone` yields an independent instance with
/// identical field values, and `clone_from` overwrites an existing instance in
/// place. Neither operation aliases the source; all components are plain
/// values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorMeasurement {
    /// Hardware timestamp (monotonic nanoseconds)
    pub timestamp_ns: i64,

    /// Hardware-reported accuracy, when the driver exposes one
    pub accuracy: Option<SensorAccuracy>,

    /// Variant the originating channel was configured for
    pub variant: SensorVariant,

    /// Channel-specific values
    pub data: MeasurementData,
}

impl SensorMeasurement {
    pub fn new(timestamp_ns: i64, variant: SensorVariant, data: MeasurementData) -> Self {
        Self {
            timestamp_ns,
            accuracy: None,
            variant,
            data,
        }
    }

    /// Channel this measurement belongs to.
    pub fn channel(&self) -> SensorChannel {
        self.data.channel()
    }
}
