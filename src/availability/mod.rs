//! Availability accounting.
//!
//! # Data Flow
//! ```text
//! ProbeOutcome        → tracker.rs (counters, downtime windows)
//! Endpoint change     → tracker.rs (failover detection)
//! snapshot(now)       → stats.rs (derived percentages, JSON report)
//! ```
//!
//! # Design Decisions
//! - Single owner, no locking: the monitor loop is the only writer
//! - At most one open downtime window at any time
//! - Statistics are derived on demand, never stored

pub mod stats;
pub mod tracker;

pub use stats::{AvailabilityStats, StatsReport};
pub use tracker::{AvailabilityTracker, DowntimeWindow};
