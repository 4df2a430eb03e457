//! Time source for the probe loop.
//!
//! Uses `tokio::time::Instant` so that paused-time tests drive the same clock
//! the monitor reads.

use std::time::{SystemTime, UNIX_EPOCH};
use tokio::time::Instant;

/// Source of monotonic and wall-clock readings.
pub trait Clock: Send + Sync {
    /// Monotonic reading used for latency and downtime accounting.
    fn now(&self) -> Instant;

    /// Seconds since the unix epoch, used only to label probe values.
    fn unix_seconds(&self) -> u64;
}

/// Real clock backed by tokio's instant and the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn unix_seconds(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}
