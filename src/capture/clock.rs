//! Monotonic clock source

use std::time::Instant;

/// Millisecond readings from a monotonic clock, relative to an arbitrary
/// epoch fixed at construction.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    epoch: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self { epoch: Instant::now() }
    }

    /// Milliseconds since the epoch, rounded to the nearest millisecond.
    pub fn now_ms(&self) -> u64 {
        (self.epoch.elapsed().as_secs_f64() * 1000.0).round() as u64
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}
