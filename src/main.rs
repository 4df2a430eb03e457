//! Redis Sentinel Failover Monitor
//!
//! Writes a heartbeat key through Sentinel once per interval and reports how
//! long writes were unavailable while the master changed.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌──────────────────────────── FailoverMonitor ────────────────────────────┐
//!   │                                                                         │
//!   │  UNRESOLVED/DEGRADED ──▶ SentinelClient::resolve ──▶ RedisSession (PING) │
//!   │                                                          │              │
//!   │  ACTIVE ──▶ SET key value EX ttl ──▶ ProbeOutcome ──▶ AvailabilityTracker │
//!   │                                                          │              │
//!   │                                     every N ops ──▶ STATS (JSON)        │
//!   └─────────────────────────────────────────────────────────────────────────┘
//!            ▲                                                    │
//!            │ SIGINT / SIGTERM ──▶ Shutdown token                ▼
//!                                                      stdout + redis_monitor.log
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use sentinel_failover_monitor::config::MonitorConfig;
use sentinel_failover_monitor::discovery::DiscoveryClient;
use sentinel_failover_monitor::lifecycle::signals::spawn_signal_handler;
use sentinel_failover_monitor::lifecycle::startup::{
    build_discovery, build_monitor, resolve_config, ConfigOverrides,
};
use sentinel_failover_monitor::lifecycle::Shutdown;
use sentinel_failover_monitor::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "sentinel-failover-monitor")]
#[command(
    about = "Continuously writes to Redis through Sentinel and measures downtime during failover",
    long_about = None
)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Sentinel address as host:port (repeatable, overrides the config file).
    #[arg(long = "sentinel")]
    sentinels: Vec<String>,

    /// Sentinel master name to monitor.
    #[arg(long)]
    group: Option<String>,

    /// Test Sentinel connection and exit.
    #[arg(long)]
    test_connection: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the monitor until interrupted (default)
    Run,
    /// Check Sentinel connectivity and exit
    Check,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let overrides = ConfigOverrides {
        sentinels: cli.sentinels,
        group_name: cli.group,
    };
    let config = match resolve_config(cli.config.as_deref(), overrides) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            return ExitCode::from(2);
        }
    };

    if let Err(e) = logging::init_logging(&config.observability) {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::from(2);
    }

    let check_only = cli.test_connection || matches!(cli.command, Some(Commands::Check));
    if check_only {
        return check_connection(&config).await;
    }

    if let Some(addr) = &config.observability.metrics_address {
        match addr.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics endpoint");
                }
            }
            Err(_) => tracing::error!(metrics_address = %addr, "Failed to parse metrics address"),
        }
    }

    let mut monitor = match build_monitor(&config) {
        Ok(monitor) => monitor,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            return ExitCode::from(2);
        }
    };

    let shutdown = Shutdown::new();
    let signal_task = spawn_signal_handler(shutdown.clone());

    monitor.run(shutdown).await;
    signal_task.abort();

    tracing::info!("Shutdown complete");
    ExitCode::SUCCESS
}

async fn check_connection(config: &MonitorConfig) -> ExitCode {
    let discovery = match build_discovery(config) {
        Ok(discovery) => discovery,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            return ExitCode::from(2);
        }
    };

    match discovery.check_connectivity().await {
        Ok(report) if !report.groups.is_empty() => {
            tracing::info!(
                sentinel = %report.answered_by,
                groups = ?report.groups,
                group_known = report.knows_group(&config.discovery.group_name),
                "Sentinel connection test passed"
            );
            println!("OK!");
            ExitCode::SUCCESS
        }
        Ok(report) => {
            eprintln!(
                "Sentinel connection test failed: {} monitors no masters",
                report.answered_by
            );
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Sentinel connection test failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
