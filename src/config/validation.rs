//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate sentinel addresses parse as `host:port`
//! - Validate value ranges (intervals, thresholds and timeouts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: MonitorConfig → Result<(), Vec<ValidationError>>
//! - Runs before the probe loop starts

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::MonitorConfig;
use crate::discovery::{Endpoint, EndpointParseError};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("discovery.sentinels must not be empty")]
    NoSentinels,

    #[error("discovery.sentinels: {0}")]
    BadSentinel(EndpointParseError),

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("backoff.base_ms ({base}) exceeds backoff.max_ms ({max})")]
    BackoffRange { base: u64, max: u64 },

    #[error("observability.metrics_address '{0}' is not a socket address")]
    BadMetricsAddress(String),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &MonitorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.discovery.sentinels.is_empty() {
        errors.push(ValidationError::NoSentinels);
    }
    for raw in &config.discovery.sentinels {
        if let Err(e) = raw.parse::<Endpoint>() {
            errors.push(ValidationError::BadSentinel(e));
        }
    }

    if config.discovery.group_name.trim().is_empty() {
        errors.push(ValidationError::Empty("discovery.group_name"));
    }
    if config.probe.key.is_empty() {
        errors.push(ValidationError::Empty("probe.key"));
    }

    let positive = [
        ("probe.ttl_secs", config.probe.ttl_secs),
        ("probe.interval_ms", config.probe.interval_ms),
        ("probe.stats_every", config.probe.stats_every),
        ("probe.failure_threshold", config.probe.failure_threshold as u64),
        ("timeouts.connect_ms", config.timeouts.connect_ms),
        ("timeouts.operation_ms", config.timeouts.operation_ms),
    ];
    for (name, value) in positive {
        if value == 0 {
            errors.push(ValidationError::Zero(name));
        }
    }

    if config.backoff.base_ms > config.backoff.max_ms {
        errors.push(ValidationError::BackoffRange {
            base: config.backoff.base_ms,
            max: config.backoff.max_ms,
        });
    }

    if let Some(addr) = &config.observability.metrics_address {
        if addr.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::BadMetricsAddress(addr.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
