//! Probe subsystem.
//!
//! # Responsibilities
//! - Define the write-capable session bound to one endpoint
//! - Normalize transport failures into `ProbeError`
//! - Carry the result of each probe as an immutable `ProbeOutcome`

pub mod redis;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::time::Instant;

use crate::discovery::Endpoint;
use crate::net::ConnectionError;

pub use redis::RedisSession;

/// Failure of a single probe write or liveness check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    /// The operation exceeded its deadline.
    #[error("probe timed out after {0:?}")]
    Timeout(Duration),

    /// Connect, I/O or protocol failure.
    #[error("probe connection error: {0}")]
    Connection(String),

    /// The server answered with an error reply (e.g. READONLY after demotion).
    #[error("probe rejected by server: {0}")]
    Rejected(String),
}

impl From<ConnectionError> for ProbeError {
    fn from(err: ConnectionError) -> Self {
        match err {
            ConnectionError::Timeout(d) => ProbeError::Timeout(d),
            other => ProbeError::Connection(other.to_string()),
        }
    }
}

/// A connection bound to a single writable endpoint.
#[async_trait]
pub trait ProbeSession: Send {
    fn endpoint(&self) -> &Endpoint;

    /// Idempotent write of `value` under `key` expiring after `ttl_secs`.
    async fn write_with_expiry(
        &mut self,
        key: &str,
        value: &[u8],
        ttl_secs: u64,
    ) -> Result<(), ProbeError>;

    /// Liveness check.
    async fn ping(&mut self) -> Result<(), ProbeError>;
}

/// Result of one probe attempt. Produced once, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub succeeded: bool,
    pub latency: Duration,
    pub timestamp: Instant,
}

impl ProbeOutcome {
    pub fn success(timestamp: Instant, latency: Duration) -> Self {
        Self {
            succeeded: true,
            latency,
            timestamp,
        }
    }

    pub fn failure(timestamp: Instant, latency: Duration) -> Self {
        Self {
            succeeded: false,
            latency,
            timestamp,
        }
    }
}
