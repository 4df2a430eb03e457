//! Downtime window and cumulative statistics state.
//!
//! # State Transitions
//! ```text
//! no window  --probe failure-->  open window (start = failure timestamp)
//! open window --probe failure--> open window (unchanged)
//! open window --probe success--> no window (duration added to cumulative downtime)
//! ```
//!
//! A failover observed while a window is open leaves the window open: the
//! outage only ends once a write against the new endpoint succeeds.

use std::time::Duration;

use tokio::time::Instant;

use crate::availability::stats::AvailabilityStats;
use crate::discovery::Endpoint;
use crate::observability::metrics;
use crate::probe::ProbeOutcome;

/// Contiguous interval during which probes were failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DowntimeWindow {
    pub start: Instant,
    pub end: Option<Instant>,
}

impl DowntimeWindow {
    fn open(start: Instant) -> Self {
        Self { start, end: None }
    }

    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }

    /// Length of the window, measured up to `now` while it is still open.
    pub fn duration_until(&self, now: Instant) -> Duration {
        self.end
            .unwrap_or(now)
            .saturating_duration_since(self.start)
    }
}

/// Owns all availability accounting for one process run.
#[derive(Debug)]
pub struct AvailabilityTracker {
    started_at: Instant,
    total_ops: u64,
    failed_ops: u64,
    cumulative_downtime: Duration,
    open_window: Option<DowntimeWindow>,
    closed_windows: u64,
    failovers: u64,
    current_endpoint: Option<Endpoint>,
}

impl AvailabilityTracker {
    pub fn new(started_at: Instant) -> Self {
        Self {
            started_at,
            total_ops: 0,
            failed_ops: 0,
            cumulative_downtime: Duration::ZERO,
            open_window: None,
            closed_windows: 0,
            failovers: 0,
            current_endpoint: None,
        }
    }

    /// Fold one probe result into the statistics.
    pub fn record_outcome(&mut self, outcome: &ProbeOutcome) {
        self.total_ops += 1;

        if outcome.succeeded {
            if let Some(mut window) = self.open_window.take() {
                window.end = Some(outcome.timestamp);
                let downtime = window.duration_until(outcome.timestamp);
                self.cumulative_downtime += downtime;
                self.closed_windows += 1;

                tracing::info!(
                    downtime_secs = downtime.as_secs_f64(),
                    endpoint = ?self.current_endpoint.as_ref().map(|e| e.to_string()),
                    "Service restored after {:.2} seconds of downtime",
                    downtime.as_secs_f64()
                );
                metrics::record_downtime_window(downtime);
            }
        } else {
            self.failed_ops += 1;

            if self.open_window.is_none() {
                self.open_window = Some(DowntimeWindow::open(outcome.timestamp));
                tracing::warn!(
                    endpoint = ?self.current_endpoint.as_ref().map(|e| e.to_string()),
                    "Downtime started - write probes failing"
                );
            }
        }

        metrics::record_probe(outcome.succeeded, outcome.latency);
    }

    /// Record the endpoint returned by a fresh resolution.
    ///
    /// Returns `true` when this is a failover (`previous` known and different).
    pub fn note_endpoint_change(&mut self, new: &Endpoint, previous: Option<&Endpoint>) -> bool {
        let failover = match previous {
            Some(prev) if prev != new => {
                tracing::warn!(
                    from = %prev,
                    to = %new,
                    downtime_open = self.open_window.is_some(),
                    "Failover detected: master changed"
                );
                metrics::record_failover();
                self.failovers += 1;
                true
            }
            _ => false,
        };

        if self.current_endpoint.as_ref() != Some(new) {
            self.current_endpoint = Some(new.clone());
        }
        failover
    }

    /// Derived statistics as of `now`; an open window counts up to `now`
    /// without being closed.
    pub fn snapshot(&self, now: Instant) -> AvailabilityStats {
        let in_progress = self
            .open_window
            .map(|w| w.duration_until(now))
            .unwrap_or(Duration::ZERO);

        AvailabilityStats {
            uptime: now.saturating_duration_since(self.started_at),
            total_ops: self.total_ops,
            failed_ops: self.failed_ops,
            cumulative_downtime: self.cumulative_downtime + in_progress,
            failovers: self.failovers,
            current_endpoint: self.current_endpoint.clone(),
            in_downtime: self.open_window.is_some(),
        }
    }

    pub fn total_ops(&self) -> u64 {
        self.total_ops
    }

    pub fn failed_ops(&self) -> u64 {
        self.failed_ops
    }

    pub fn in_downtime(&self) -> bool {
        self.open_window.is_some()
    }

    pub fn open_window(&self) -> Option<DowntimeWindow> {
        self.open_window
    }

    pub fn closed_windows(&self) -> u64 {
        self.closed_windows
    }

    pub fn failovers(&self) -> u64 {
        self.failovers
    }

    /// Downtime of closed windows only.
    pub fn cumulative_downtime(&self) -> Duration {
        self.cumulative_downtime
    }

    pub fn current_endpoint(&self) -> Option<&Endpoint> {
        self.current_endpoint.as_ref()
    }
}
