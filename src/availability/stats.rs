//! Derived availability statistics.

use std::time::Duration;

use serde::Serialize;

use crate::discovery::Endpoint;

/// Point-in-time statistics, recomputed on demand from the tracker.
#[derive(Debug, Clone, PartialEq)]
pub struct AvailabilityStats {
    /// Time since the monitor started.
    pub uptime: Duration,
    pub total_ops: u64,
    pub failed_ops: u64,
    /// Closed windows plus the in-progress part of an open window.
    pub cumulative_downtime: Duration,
    pub failovers: u64,
    pub current_endpoint: Option<Endpoint>,
    pub in_downtime: bool,
}

impl AvailabilityStats {
    /// Share of elapsed time not spent in downtime, in `[0, 100]`.
    pub fn availability_percent(&self) -> f64 {
        if self.uptime.is_zero() || self.cumulative_downtime.is_zero() {
            return 100.0;
        }
        let elapsed = self.uptime.as_secs_f64();
        let down = self.cumulative_downtime.as_secs_f64();
        ((elapsed - down) / elapsed * 100.0).clamp(0.0, 100.0)
    }

    /// Share of probes that succeeded, in `[0, 100]`.
    pub fn success_rate_percent(&self) -> f64 {
        let succeeded = self.total_ops.saturating_sub(self.failed_ops);
        succeeded as f64 / self.total_ops.max(1) as f64 * 100.0
    }

    /// Rounded, serializable form used for log emission.
    pub fn report(&self) -> StatsReport {
        StatsReport {
            uptime_seconds: round_to(self.uptime.as_secs_f64(), 2),
            total_operations: self.total_ops,
            failed_operations: self.failed_ops,
            success_rate_percent: round_to(self.success_rate_percent(), 2),
            total_downtime_seconds: round_to(self.cumulative_downtime.as_secs_f64(), 2),
            availability_percent: round_to(self.availability_percent(), 4),
            failovers: self.failovers,
            current_master: self
                .current_endpoint
                .as_ref()
                .map(|e| e.to_string())
                .unwrap_or_else(|| "Unknown".to_string()),
            in_downtime: self.in_downtime,
        }
    }
}

/// JSON shape of a statistics emission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsReport {
    pub uptime_seconds: f64,
    pub total_operations: u64,
    pub failed_operations: u64,
    pub success_rate_percent: f64,
    pub total_downtime_seconds: f64,
    pub availability_percent: f64,
    pub failovers: u64,
    pub current_master: String,
    pub in_downtime: bool,
}

impl StatsReport {
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| format!("{:?}", self))
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(uptime_ms: u64, downtime_ms: u64) -> AvailabilityStats {
        AvailabilityStats {
            uptime: Duration::from_millis(uptime_ms),
            total_ops: 10,
            failed_ops: 0,
            cumulative_downtime: Duration::from_millis(downtime_ms),
            failovers: 0,
            current_endpoint: Some(Endpoint::new("10.0.0.1", 6379)),
            in_downtime: false,
        }
    }

    #[test]
    fn test_zero_downtime_is_exactly_full_availability() {
        assert_eq!(stats(10_000, 0).availability_percent(), 100.0);
        assert_eq!(stats(0, 0).availability_percent(), 100.0);
        assert_eq!(stats(3_333, 0).availability_percent(), 100.0);
    }

    #[test]
    fn test_availability_is_clamped() {
        assert_eq!(stats(1_000, 5_000).availability_percent(), 0.0);
        assert!((stats(10_000, 2_500).availability_percent() - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_success_rate_with_no_operations() {
        let mut s = stats(1_000, 0);
        s.total_ops = 0;
        assert_eq!(s.success_rate_percent(), 0.0);
        s.total_ops = 4;
        s.failed_ops = 1;
        assert_eq!(s.success_rate_percent(), 75.0);
    }

    #[test]
    fn test_report_json_fields() {
        let report = stats(10_004, 0).report();
        assert_eq!(report.uptime_seconds, 10.0);
        assert_eq!(report.current_master, "10.0.0.1:6379");

        let json: serde_json::Value = serde_json::from_str(&report.to_json_pretty()).unwrap();
        assert_eq!(json["total_operations"], 10);
        assert_eq!(json["failed_operations"], 0);
        assert_eq!(json["availability_percent"], 100.0);
        assert_eq!(json["current_master"], "10.0.0.1:6379");
    }

    #[test]
    fn test_unknown_master_label() {
        let mut s = stats(1_000, 0);
        s.current_endpoint = None;
        assert_eq!(s.report().current_master, "Unknown");
    }
}
