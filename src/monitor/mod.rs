//! Failover monitoring.
//!
//! # Data Flow
//! ```text
//! loop:
//!     (Unresolved | Degraded) → DiscoveryClient::resolve → open_session → Active
//!     Active → ProbeSession::write_with_expiry → ProbeOutcome → AvailabilityTracker
//!     every Nth op → statistics snapshot
//!     sleep(interval) raced against shutdown
//! ```
//!
//! # Design Decisions
//! - One control loop owns every piece of mutable state; no locking
//! - Probe and discovery errors are data points, never fatal
//! - Repeated failures force a fresh resolution even if the endpoint is unchanged

pub mod failover;
pub mod state;

pub use failover::{CycleOutcome, FailoverMonitor, MonitorSettings};
pub use state::{MonitorState, Phase};
