//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Monitor and tracker produce:
//!     → logging.rs (structured events: connect, downtime, failover, STATS)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout and the append-only log file
//!     → Prometheus scrape endpoint (optional)
//! ```

pub mod logging;
pub mod metrics;
