//! Metrics collection and exposition.
//!
//! # Metrics
//! - `monitor_probes_total` (counter): probe writes by result
//! - `monitor_probe_latency_seconds` (histogram): probe write latency
//! - `monitor_downtime_windows_total` (counter): closed downtime windows
//! - `monitor_downtime_seconds` (gauge): downtime accumulated by closed windows
//! - `monitor_failovers_total` (counter): endpoint changes between resolutions
//! - `monitor_resolutions_total` (counter): discovery calls by result
//! - `monitor_availability_percent` (gauge): last emitted availability
//!
//! Recording is a no-op until `init_metrics` installs the exporter.

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::availability::AvailabilityStats;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_probe(succeeded: bool, latency: Duration) {
    let result = if succeeded { "success" } else { "failure" };
    ::metrics::counter!("monitor_probes_total", "result" => result).increment(1);
    ::metrics::histogram!("monitor_probe_latency_seconds").record(latency.as_secs_f64());
}

pub fn record_downtime_window(downtime: Duration) {
    ::metrics::counter!("monitor_downtime_windows_total").increment(1);
    ::metrics::gauge!("monitor_downtime_seconds").increment(downtime.as_secs_f64());
}

pub fn record_failover() {
    ::metrics::counter!("monitor_failovers_total").increment(1);
}

pub fn record_resolution(succeeded: bool) {
    let result = if succeeded { "success" } else { "failure" };
    ::metrics::counter!("monitor_resolutions_total", "result" => result).increment(1);
}

pub fn record_stats(stats: &AvailabilityStats) {
    ::metrics::gauge!("monitor_availability_percent").set(stats.availability_percent());
}
