//! Process-wide sampling interval shared by every sensor generator.
//!
//! The interval is stored as the bit pattern of an `f64` inside an
//! [`AtomicU64`] so generators can read it on every cycle without taking a
//! lock. A write becomes visible to each generator at its next
//! sleep-scheduling point; sleeps already in flight are not shortened.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Lowest accepted interval in seconds.
pub const MIN_INTERVAL_SECS: f64 = 0.5;

/// Highest accepted interval in seconds.
pub const MAX_INTERVAL_SECS: f64 = 10.0;

/// Interval used at startup when nothing else is configured.
pub const DEFAULT_INTERVAL_SECS: f64 = 3.0;

/// Clamp a requested interval into `[MIN_INTERVAL_SECS, MAX_INTERVAL_SECS]`.
///
/// Infinities clamp to the nearest bound. Returns `None` for NaN, which has
/// no meaningful position in the range.
pub fn clamp_interval(requested: f64) -> Option<f64> {
    if requested.is_nan() {
        return None;
    }
    Some(requested.clamp(MIN_INTERVAL_SECS, MAX_INTERVAL_SECS))
}

/// Holder of the current sampling interval.
#[derive(Debug)]
pub struct SamplingController {
    interval_bits: AtomicU64,
}

impl SamplingController {
    /// Create a controller starting at `initial_secs` (clamped).
    pub fn new(initial_secs: f64) -> Self {
        let initial = clamp_interval(initial_secs).unwrap_or(DEFAULT_INTERVAL_SECS);
        Self {
            interval_bits: AtomicU64::new(initial.to_bits()),
        }
    }

    /// Current interval in seconds.
    pub fn interval_secs(&self) -> f64 {
        f64::from_bits(self.interval_bits.load(Ordering::Acquire))
    }

    /// Current interval as a [`Duration`].
    pub fn interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.interval_secs())
            .unwrap_or_else(|_| Duration::from_secs(3))
    }

    /// Clamp `requested`, store it, and return the effective interval.
    ///
    /// Out-of-range values are clamped rather than rejected. A NaN request
    /// leaves the interval unchanged and returns the current value.
    pub fn set_interval(&self, requested: f64) -> f64 {
        match clamp_interval(requested) {
            Some(effective) => {
                self.interval_bits
                    .store(effective.to_bits(), Ordering::Release);
                effective
            }
            None => self.interval_secs(),
        }
    }
}

impl Default for SamplingController {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL_SECS)
    }
}
