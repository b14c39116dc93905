//! Monotonic clock helper.

use std::sync::OnceLock;
use std::time::Instant;

static ANCHOR: OnceLock<Instant> = OnceLock::new();

/// Current monotonic timestamp in nanoseconds.
///
/// Anchored at first use within the process. Readings share the hardware
/// timestamp model: monotonic, arbitrary epoch, only differences meaningful.
pub fn monotonic_timestamp_ns() -> i64 {
    ANCHOR.get_or_init(Instant::now).elapsed().as_nanos() as i64
}
