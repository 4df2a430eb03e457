//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the monitor.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the failover monitor.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct MonitorConfig {
    /// Sentinel addresses and the monitored group.
    pub discovery: DiscoveryConfig,

    /// Probe write settings and state machine thresholds.
    pub probe: ProbeConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Delay between failed resolution attempts.
    pub backoff: BackoffConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Discovery layer configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Sentinel addresses as `host:port`, tried in order.
    pub sentinels: Vec<String>,

    /// Logical group (Sentinel master name) to resolve.
    pub group_name: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            sentinels: vec![
                "172.30.0.1:26380".to_string(),
                "172.30.0.1:26381".to_string(),
                "172.30.0.1:26382".to_string(),
            ],
            group_name: "mymaster".to_string(),
        }
    }
}

/// Probe configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Key written by every probe.
    pub key: String,

    /// Expiry applied to the probe key, in seconds.
    pub ttl_secs: u64,

    /// Delay between probes in milliseconds.
    pub interval_ms: u64,

    /// Emit a statistics snapshot every N total operations.
    pub stats_every: u64,

    /// Consecutive failures that force a fresh resolution.
    pub failure_threshold: u32,
}

impl ProbeConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            key: "monitor:heartbeat".to_string(),
            ttl_secs: 300,
            interval_ms: 1000,
            stats_every: 10,
            failure_threshold: 3,
        }
    }
}

/// Timeout configuration for network calls.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in milliseconds.
    pub connect_ms: u64,

    /// Per-command timeout in milliseconds.
    pub operation_ms: u64,
}

impl TimeoutConfig {
    pub fn connect(&self) -> Duration {
        Duration::from_millis(self.connect_ms)
    }

    pub fn operation(&self) -> Duration {
        Duration::from_millis(self.operation_ms)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_ms: 2000,
            operation_ms: 2000,
        }
    }
}

/// Backoff configuration for failed resolutions.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackoffConfig {
    /// Delay after the first failure in milliseconds.
    pub base_ms: u64,

    /// Upper bound for the delay in milliseconds.
    pub max_ms: u64,

    /// Add up to 10% random jitter.
    pub jitter: bool,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            base_ms: 5000,
            max_ms: 5000,
            jitter: false,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Append-only log file mirroring stdout. `None` disables it.
    pub log_file: Option<String>,

    /// Prometheus scrape endpoint bind address. `None` disables it.
    pub metrics_address: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_file: Some("redis_monitor.log".to_string()),
            metrics_address: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: MonitorConfig = toml::from_str(
            r#"
            [discovery]
            sentinels = ["10.0.0.5:26379"]

            [probe]
            interval_ms = 250
            "#,
        )
        .unwrap();

        assert_eq!(config.discovery.sentinels, vec!["10.0.0.5:26379"]);
        assert_eq!(config.discovery.group_name, "mymaster");
        assert_eq!(config.probe.interval(), Duration::from_millis(250));
        assert_eq!(config.probe.failure_threshold, 3);
        assert_eq!(config.probe.stats_every, 10);
        assert_eq!(config.timeouts.connect(), Duration::from_secs(2));
        assert_eq!(config.backoff.base_ms, 5000);
    }
}
