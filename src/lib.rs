//! Redis Sentinel failover monitor.
//!
//! Continuously writes to the master of a Sentinel-managed group and measures
//! availability and downtime across failovers.

pub mod availability;
pub mod clock;
pub mod config;
pub mod discovery;
pub mod lifecycle;
pub mod monitor;
pub mod net;
pub mod observability;
pub mod probe;
pub mod resilience;

pub use config::MonitorConfig;
pub use lifecycle::Shutdown;
pub use monitor::FailoverMonitor;
