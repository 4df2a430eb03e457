//! Failover monitor loop.
//!
//! # Responsibilities
//! - Resolve the writable endpoint and bind a session to it
//! - Issue one write-with-expiry probe per cycle and time it
//! - Feed every outcome to the availability tracker
//! - Force re-resolution after repeated failures
//! - Emit statistics periodically and once more on shutdown

use std::time::Duration;

use rand::Rng;

use crate::availability::{AvailabilityStats, AvailabilityTracker};
use crate::clock::{Clock, SystemClock};
use crate::config::{BackoffConfig, MonitorConfig};
use crate::discovery::{DiscoveryClient, DiscoveryError, Endpoint};
use crate::lifecycle::Shutdown;
use crate::monitor::state::{MonitorState, Phase};
use crate::observability::metrics;
use crate::probe::{ProbeError, ProbeOutcome, ProbeSession};
use crate::resilience::timeouts::with_deadline;
use crate::resilience::ReconnectBackoff;

/// Static loop parameters.
#[derive(Debug, Clone)]
pub struct MonitorSettings {
    pub group_name: String,
    pub key: String,
    pub ttl_secs: u64,
    pub interval: Duration,
    pub stats_every: u64,
    pub failure_threshold: u32,
    pub operation_timeout: Duration,
    pub backoff: BackoffConfig,
}

impl From<&MonitorConfig> for MonitorSettings {
    fn from(config: &MonitorConfig) -> Self {
        Self {
            group_name: config.discovery.group_name.clone(),
            key: config.probe.key.clone(),
            ttl_secs: config.probe.ttl_secs,
            interval: config.probe.interval(),
            stats_every: config.probe.stats_every.max(1),
            failure_threshold: config.probe.failure_threshold.max(1),
            operation_timeout: config.timeouts.operation(),
            backoff: config.backoff.clone(),
        }
    }
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self::from(&MonitorConfig::default())
    }
}

/// What a single cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Discovery or session setup failed; wait `retry_in` before the next cycle.
    ResolutionFailed { retry_in: Duration },
    /// A probe was issued.
    Probed { succeeded: bool, stats_emitted: bool },
    /// The monitor has shut down; nothing was done.
    Stopped,
}

/// Drives probes against whatever replica discovery reports as writable.
pub struct FailoverMonitor<D: DiscoveryClient, C: Clock = SystemClock> {
    discovery: D,
    clock: C,
    settings: MonitorSettings,
    state: MonitorState<D::Session>,
    last_endpoint: Option<Endpoint>,
    tracker: AvailabilityTracker,
    backoff: ReconnectBackoff,
    resolutions: u64,
}

impl<D: DiscoveryClient> FailoverMonitor<D, SystemClock> {
    pub fn new(discovery: D, settings: MonitorSettings) -> Self {
        Self::with_clock(discovery, SystemClock, settings)
    }
}

impl<D: DiscoveryClient, C: Clock> FailoverMonitor<D, C> {
    pub fn with_clock(discovery: D, clock: C, settings: MonitorSettings) -> Self {
        let tracker = AvailabilityTracker::new(clock.now());
        let backoff = ReconnectBackoff::new(settings.backoff.clone());
        Self {
            discovery,
            clock,
            settings,
            state: MonitorState::Unresolved,
            last_endpoint: None,
            tracker,
            backoff,
            resolutions: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.state.consecutive_failures()
    }

    pub fn tracker(&self) -> &AvailabilityTracker {
        &self.tracker
    }

    /// Number of discovery calls issued so far.
    pub fn resolutions(&self) -> u64 {
        self.resolutions
    }

    pub fn settings(&self) -> &MonitorSettings {
        &self.settings
    }

    /// Run cycles until `shutdown` is triggered, then emit final statistics
    /// and release the session.
    pub async fn run(&mut self, shutdown: Shutdown) -> AvailabilityStats {
        tracing::info!("=== Starting Redis Sentinel Monitor ===");
        tracing::info!(
            group = %self.settings.group_name,
            interval_ms = self.settings.interval.as_millis() as u64,
            failure_threshold = self.settings.failure_threshold,
            stats_every = self.settings.stats_every,
            "Monitor configured"
        );

        loop {
            if shutdown.is_triggered() {
                break;
            }

            let pause = match self.run_cycle().await {
                CycleOutcome::ResolutionFailed { retry_in } => {
                    tracing::warn!(
                        retry_in_ms = retry_in.as_millis() as u64,
                        "Retrying connection in {:.1} seconds...",
                        retry_in.as_secs_f64()
                    );
                    retry_in
                }
                CycleOutcome::Probed { .. } => self.settings.interval,
                CycleOutcome::Stopped => break,
            };

            tokio::select! {
                _ = shutdown.wait() => break,
                _ = tokio::time::sleep(pause) => {}
            }
        }

        self.shutdown()
    }

    /// One pass of the per-cycle algorithm, without the trailing sleep.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        if matches!(self.state, MonitorState::ShuttingDown) {
            return CycleOutcome::Stopped;
        }

        if self.state.needs_resolution() {
            if let Err(retry_in) = self.ensure_session().await {
                return CycleOutcome::ResolutionFailed { retry_in };
            }
        }

        let succeeded = self.probe().await;

        let stats_emitted = self.tracker.total_ops() % self.settings.stats_every == 0;
        if stats_emitted {
            self.emit_stats();
        }

        CycleOutcome::Probed {
            succeeded,
            stats_emitted,
        }
    }

    /// Snapshot the tracker and log it as JSON.
    pub fn emit_stats(&self) -> AvailabilityStats {
        let stats = self.tracker.snapshot(self.clock.now());
        tracing::info!("STATS: {}", stats.report().to_json_pretty());
        metrics::record_stats(&stats);
        stats
    }

    /// Enter the terminal state: final statistics, then release the session.
    pub fn shutdown(&mut self) -> AvailabilityStats {
        tracing::info!("Performing cleanup...");
        let stats = self.emit_stats();
        self.state = MonitorState::ShuttingDown;
        stats
    }

    async fn ensure_session(&mut self) -> Result<(), Duration> {
        let previous_state = std::mem::replace(&mut self.state, MonitorState::Unresolved);
        if let MonitorState::Degraded {
            endpoint,
            consecutive_failures,
        } = &previous_state
        {
            tracing::warn!(
                endpoint = %endpoint,
                consecutive_failures,
                "Forcing re-resolution after consecutive write failures"
            );
        }

        self.resolutions += 1;
        let endpoint = match self.discovery.resolve(&self.settings.group_name).await {
            Ok(endpoint) => endpoint,
            Err(e) => {
                match &e {
                    DiscoveryError::GroupNotFound(group) => {
                        tracing::error!(group = %group, "Master '{}' not found", group)
                    }
                    DiscoveryError::Unavailable(reason) => {
                        tracing::error!(reason = %reason, "Failed to resolve master: discovery unavailable")
                    }
                }
                return Err(self.fail_resolution(previous_state));
            }
        };

        let session = match self.discovery.open_session(&endpoint).await {
            Ok(session) => session,
            Err(e) => {
                tracing::error!(endpoint = %endpoint, error = %e, "Failed to get master connection");
                return Err(self.fail_resolution(previous_state));
            }
        };

        metrics::record_resolution(true);
        self.tracker
            .note_endpoint_change(&endpoint, self.last_endpoint.as_ref());
        tracing::info!(endpoint = %endpoint, "Connected to Redis master: {}", endpoint);

        self.last_endpoint = Some(endpoint.clone());
        self.backoff.reset();
        self.state = MonitorState::Active {
            endpoint,
            session,
            consecutive_failures: 0,
        };
        Ok(())
    }

    /// Restore the pre-resolution state and compute the retry delay.
    fn fail_resolution(&mut self, previous_state: MonitorState<D::Session>) -> Duration {
        metrics::record_resolution(false);
        self.state = previous_state;
        self.backoff.next_delay()
    }

    async fn probe(&mut self) -> bool {
        let MonitorState::Active {
            session,
            consecutive_failures,
            ..
        } = &mut self.state
        else {
            return false;
        };

        let value = probe_value(self.clock.unix_seconds());
        let started = self.clock.now();
        let result = with_deadline(
            self.settings.operation_timeout,
            session.write_with_expiry(&self.settings.key, value.as_bytes(), self.settings.ttl_secs),
        )
        .await
        .unwrap_or(Err(ProbeError::Timeout(self.settings.operation_timeout)));
        let finished = self.clock.now();
        let latency = finished.saturating_duration_since(started);
        let latency_ms = latency.as_secs_f64() * 1000.0;

        let succeeded = match result {
            Ok(()) => {
                *consecutive_failures = 0;
                tracing::debug!(latency_ms, "Write successful ({:.2}ms)", latency_ms);
                self.tracker
                    .record_outcome(&ProbeOutcome::success(finished, latency));
                true
            }
            Err(e) => {
                *consecutive_failures += 1;
                tracing::error!(error = %e, "Failed to write to Redis: {}", e);
                tracing::warn!(
                    latency_ms,
                    consecutive_failures = *consecutive_failures,
                    "Write failed ({:.2}ms)",
                    latency_ms
                );
                self.tracker
                    .record_outcome(&ProbeOutcome::failure(finished, latency));
                false
            }
        };

        if self.state.consecutive_failures() >= self.settings.failure_threshold {
            let state = std::mem::replace(&mut self.state, MonitorState::Unresolved);
            self.state = state.degrade();
            tracing::warn!(
                threshold = self.settings.failure_threshold,
                "Failure threshold reached, endpoint marked {}",
                Phase::Degraded
            );
        }

        succeeded
    }
}

fn probe_value(unix_seconds: u64) -> String {
    let nonce: u32 = rand::thread_rng().gen_range(0..10_000);
    format!("heartbeat_{}_{}", unix_seconds, nonce)
}
