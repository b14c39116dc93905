//! Per-channel measurement buffer.
//!
//! A capacity-bounded FIFO over `HeapRb`. Timestamps are non-decreasing in
//! insertion order (per-channel delivery is in order), so the stale prefix and
//! the join prefix are both contiguous runs at the front.

use std::fmt;

use contracts::SensorMeasurement;
use ringbuf::{traits::*, HeapRb};

/// Capacity-bounded, insertion-ordered queue of pending measurements for one
/// channel.
///
/// A push against a full buffer is rejected and the sample handed back; the
/// overflow policy (stop vs. oldest-eviction) is decided by the caller.
pub struct ChannelBuffer {
    ring: HeapRb<SensorMeasurement>,
    capacity: usize,
}

impl fmt::Debug for ChannelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelBuffer")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl ChannelBuffer {
    /// Create a buffer bounded at `capacity` samples. Capacity is validated
    /// upstream and must be positive.
    pub fn new(capacity: usize) -> Self {
        Self {
            ring: HeapRb::new(capacity),
            capacity,
        }
    }

    /// Append a measurement, or hand it back when the buffer is at capacity.
    #[inline]
    pub fn push(&mut self, measurement: SensorMeasurement) -> Result<(), SensorMeasurement> {
        self.ring.try_push(measurement)
    }

    /// Remove and return the oldest measurement.
    #[inline]
    pub fn pop(&mut self) -> Option<SensorMeasurement> {
        self.ring.try_pop()
    }

    /// Timestamp of the oldest buffered measurement.
    #[inline]
    pub fn front_timestamp(&self) -> Option<i64> {
        self.ring.iter().next().map(|m| m.timestamp_ns)
    }

    /// Buffered timestamps, oldest first.
    #[inline]
    pub fn timestamps(&self) -> impl Iterator<Item = i64> + '_ {
        self.ring.iter().map(|m| m.timestamp_ns)
    }

    /// Pop the first `n` measurements and return the last of them.
    ///
    /// The earlier entries are superseded: once a later candidate exists at or
    /// before the reference time, they can never contribute to a future join.
    pub fn consume_prefix(&mut self, n: usize) -> Option<SensorMeasurement> {
        let mut last = None;
        for _ in 0..n {
            match self.ring.try_pop() {
                Some(m) => last = Some(m),
                None => break,
            }
        }
        last
    }

    /// Drain measurements strictly older than `cutoff_ns` into `out`.
    ///
    /// Returns the number drained.
    pub fn drain_stale(&mut self, cutoff_ns: i64, out: &mut Vec<SensorMeasurement>) -> usize {
        let mut drained = 0;
        while self.front_timestamp().is_some_and(|ts| ts < cutoff_ns) {
            if let Some(m) = self.ring.try_pop() {
                out.push(m);
                drained += 1;
            }
        }
        drained
    }

    /// Drop every buffered measurement.
    pub fn clear(&mut self) {
        while self.ring.try_pop().is_some() {}
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ring.occupied_len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Buffered-count divided by configured capacity.
    #[inline]
    pub fn usage(&self) -> f64 {
        self.len() as f64 / self.capacity as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{MeasurementData, SensorVariant, Vector3};

    fn gravity(timestamp_ns: i64) -> SensorMeasurement {
        SensorMeasurement::new(
            timestamp_ns,
            SensorVariant::Calibrated,
            MeasurementData::Gravity {
                gravity: Vector3::new(0.0, 0.0, 9.81),
            },
        )
    }

    #[test]
    fn push_rejects_at_capacity() {
        let mut buffer = ChannelBuffer::new(2);
        assert!(buffer.push(gravity(1)).is_ok());
        assert!(buffer.push(gravity(2)).is_ok());

        let rejected = buffer.push(gravity(3)).unwrap_err();
        assert_eq!(rejected.timestamp_ns, 3);
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn usage_is_exact_ratio() {
        let mut buffer = ChannelBuffer::new(4);
        buffer.push(gravity(1)).unwrap();
        assert_eq!(buffer.usage(), 0.25);
        buffer.push(gravity(2)).unwrap();
        assert_eq!(buffer.usage(), 0.5);
    }

    #[test]
    fn consume_prefix_returns_last_of_run() {
        let mut buffer = ChannelBuffer::new(8);
        for ts in [10, 20, 30, 40] {
            buffer.push(gravity(ts)).unwrap();
        }

        let candidate = buffer.consume_prefix(3).unwrap();
        assert_eq!(candidate.timestamp_ns, 30);
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.front_timestamp(), Some(40));
    }

    #[test]
    fn drain_stale_removes_old_prefix() {
        let mut buffer = ChannelBuffer::new(8);
        for ts in [100, 200, 300] {
            buffer.push(gravity(ts)).unwrap();
        }

        let mut out = Vec::new();
        let drained = buffer.drain_stale(250, &mut out);
        assert_eq!(drained, 2);
        assert_eq!(out.len(), 2);
        assert_eq!(buffer.front_timestamp(), Some(300));

        // Cutoff is exclusive: a measurement exactly at the cutoff survives
        let drained = buffer.drain_stale(300, &mut out);
        assert_eq!(drained, 0);
    }

    #[test]
    fn clear_empties_buffer() {
        let mut buffer = ChannelBuffer::new(4);
        buffer.push(gravity(1)).unwrap();
        buffer.push(gravity(2)).unwrap();
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.usage(), 0.0);
    }
}
