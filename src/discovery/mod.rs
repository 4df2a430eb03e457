//! Discovery subsystem.
//!
//! # Data Flow
//! ```text
//! FailoverMonitor
//!     → DiscoveryClient::resolve(group)      → Endpoint | DiscoveryError
//!     → DiscoveryClient::open_session(ep)    → ProbeSession | ProbeError
//! ```
//!
//! # Design Decisions
//! - Adapters normalize every transport failure into a tagged error so the
//!   state machine only branches on explicit variants
//! - A session is bound to exactly one endpoint; a new endpoint means a new
//!   session

pub mod endpoint;
pub mod sentinel;

use async_trait::async_trait;
use thiserror::Error;

use crate::probe::{ProbeError, ProbeSession};

pub use endpoint::{Endpoint, EndpointParseError};
pub use sentinel::SentinelClient;

/// Failure to resolve the writable endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscoveryError {
    /// No discovery server answered, or all answers were unusable.
    #[error("discovery unavailable: {0}")]
    Unavailable(String),

    /// Discovery answered but does not know the group.
    #[error("group '{0}' not found")]
    GroupNotFound(String),
}

/// Result of a one-shot connectivity check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectivityReport {
    /// Discovery server that answered.
    pub answered_by: Endpoint,
    /// Groups it reports as monitored.
    pub groups: Vec<String>,
}

impl ConnectivityReport {
    pub fn knows_group(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g == group)
    }
}

/// Resolves the writable endpoint for a logical group and opens sessions to it.
#[async_trait]
pub trait DiscoveryClient: Send + Sync {
    type Session: ProbeSession;

    /// Ask discovery which endpoint is currently writable for `group`.
    async fn resolve(&self, group: &str) -> Result<Endpoint, DiscoveryError>;

    /// Open a session bound to `endpoint` and verify it is alive.
    async fn open_session(&self, endpoint: &Endpoint) -> Result<Self::Session, ProbeError>;

    /// One-shot check that the discovery layer is reachable.
    async fn check_connectivity(&self) -> Result<ConnectivityReport, DiscoveryError>;
}
