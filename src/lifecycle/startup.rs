//! Startup orchestration.
//!
//! # Responsibilities
//! - Load configuration and apply command-line overrides
//! - Validate the result before anything touches the network
//! - Build the Sentinel client and the monitor
//!
//! Any error here is fatal: the process exits before the loop starts.

use std::path::Path;

use crate::config::{load_config, validate_config, ConfigError, MonitorConfig, ValidationError};
use crate::discovery::SentinelClient;
use crate::monitor::{FailoverMonitor, MonitorSettings};

/// Values given on the command line that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub sentinels: Vec<String>,
    pub group_name: Option<String>,
}

/// Load the config file (or defaults), apply overrides and validate.
pub fn resolve_config(
    path: Option<&Path>,
    overrides: ConfigOverrides,
) -> Result<MonitorConfig, ConfigError> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => MonitorConfig::default(),
    };

    if !overrides.sentinels.is_empty() {
        config.discovery.sentinels = overrides.sentinels;
    }
    if let Some(group) = overrides.group_name {
        config.discovery.group_name = group;
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Build the Sentinel discovery client described by `config`.
pub fn build_discovery(config: &MonitorConfig) -> Result<SentinelClient, ConfigError> {
    SentinelClient::from_config(&config.discovery, config.timeouts)
        .map_err(|e| ConfigError::Validation(vec![ValidationError::BadSentinel(e)]))
}

/// Build a monitor wired to the configured sentinels.
pub fn build_monitor(config: &MonitorConfig) -> Result<FailoverMonitor<SentinelClient>, ConfigError> {
    let discovery = build_discovery(config)?;
    tracing::info!(
        group = %config.discovery.group_name,
        sentinels = ?config.discovery.sentinels,
        "Sentinel hosts configured"
    );
    Ok(FailoverMonitor::new(discovery, MonitorSettings::from(config)))
}
