//! Log file layer: events reach the append-only file alongside stdout.
//!
//! Runs in its own test binary because the global subscriber can be
//! installed only once per process.

use std::time::Duration;

use sentinel_failover_monitor::availability::AvailabilityTracker;
use sentinel_failover_monitor::config::ObservabilityConfig;
use sentinel_failover_monitor::discovery::Endpoint;
use sentinel_failover_monitor::observability::logging::{init_logging, LoggingError};
use sentinel_failover_monitor::probe::ProbeOutcome;
use tokio::time::Instant;

fn config(log_file: Option<String>) -> ObservabilityConfig {
    ObservabilityConfig {
        log_level: "info".to_string(),
        log_file,
        metrics_address: None,
    }
}

#[tokio::test]
async fn test_downtime_and_failover_events_are_appended_to_log_file() {
    std::env::remove_var("RUST_LOG");

    let dir = std::env::temp_dir();
    let unopenable = dir.join("no-such-dir").join("monitor.log");
    let err = init_logging(&config(Some(unopenable.display().to_string()))).unwrap_err();
    assert!(matches!(err, LoggingError::LogFile { .. }));

    let path = dir.join(format!("monitor-log-{}.log", std::process::id()));
    std::fs::write(&path, "earlier run\n").unwrap();
    init_logging(&config(Some(path.display().to_string()))).unwrap();

    let old_master = Endpoint::new("10.0.0.1", 6379);
    let new_master = Endpoint::new("10.0.0.2", 6379);
    let mut tracker = AvailabilityTracker::new(Instant::now());
    tracker.note_endpoint_change(&old_master, None);

    tracker.record_outcome(&ProbeOutcome::failure(Instant::now(), Duration::from_millis(5)));
    assert!(tracker.note_endpoint_change(&new_master, Some(&old_master)));
    tracker.record_outcome(&ProbeOutcome::success(Instant::now(), Duration::from_millis(1)));

    let contents = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert!(contents.starts_with("earlier run\n"));
    assert!(contents.contains("Downtime started"));
    assert!(contents.contains("Failover detected: master changed"));
    assert!(contents.contains("Service restored after"));
    assert!(!contents.contains("\u{1b}["), "file layer must not carry ANSI colours");

    let err = init_logging(&config(None)).unwrap_err();
    assert!(matches!(err, LoggingError::Init(_)));
}
