//! Request/reply connection to a Redis or Sentinel server.
//!
//! # Responsibilities
//! - Establish TCP connections under the connect deadline
//! - Run one command at a time under the operation deadline
//! - Tag each connection with a unique ID for tracing
//! - Refuse further commands once a round trip fails
//!
//! After a timeout, I/O or protocol error the stream position is unknown: a
//! late reply may still arrive, or undecodable bytes may sit in the buffer.
//! The connection is marked broken and must be replaced. The stream is
//! released when the connection is dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::discovery::Endpoint;
use crate::net::resp::{encode_command, parse_reply, ProtocolError, Reply};
use crate::resilience::timeouts::with_deadline;

/// Global atomic counter for connection IDs.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generate a new unique connection ID.
    pub fn new() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Transport-level failure.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("connect to {endpoint} failed: {source}")]
    Connect {
        endpoint: Endpoint,
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection closed by peer")]
    Closed,

    #[error("deadline of {0:?} exceeded")]
    Timeout(Duration),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("connection unusable after an earlier failure")]
    Broken,
}

/// A single RESP connection.
#[derive(Debug)]
pub struct RespConnection {
    id: ConnectionId,
    endpoint: Endpoint,
    stream: TcpStream,
    buf: Vec<u8>,
    operation_timeout: Duration,
    broken: bool,
}

impl RespConnection {
    /// Connect to `endpoint` within `connect_timeout`.
    pub async fn connect(
        endpoint: &Endpoint,
        connect_timeout: Duration,
        operation_timeout: Duration,
    ) -> Result<Self, ConnectionError> {
        let stream = with_deadline(
            connect_timeout,
            TcpStream::connect((endpoint.host.as_str(), endpoint.port)),
        )
        .await
        .map_err(|_| ConnectionError::Timeout(connect_timeout))?
        .map_err(|source| ConnectionError::Connect {
            endpoint: endpoint.clone(),
            source,
        })?;
        stream.set_nodelay(true)?;

        let id = ConnectionId::new();
        tracing::debug!(conn_id = %id, endpoint = %endpoint, "Connection established");

        Ok(Self {
            id,
            endpoint: endpoint.clone(),
            stream,
            buf: Vec::with_capacity(512),
            operation_timeout,
            broken: false,
        })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// True once a round trip has failed; no further commands are sent.
    pub fn is_broken(&self) -> bool {
        self.broken
    }

    /// Send one command and wait for its reply within the operation deadline.
    ///
    /// Server error replies are returned as `Reply::Error`, not as `Err`.
    pub async fn request(&mut self, args: &[&[u8]]) -> Result<Reply, ConnectionError> {
        if self.broken {
            return Err(ConnectionError::Broken);
        }

        // Held until a full reply arrives, so a request cancelled by an
        // outer deadline also leaves the connection broken.
        self.broken = true;

        let deadline = self.operation_timeout;
        let result = with_deadline(deadline, self.round_trip(args))
            .await
            .map_err(|_| ConnectionError::Timeout(deadline))
            .and_then(|reply| reply);

        match &result {
            Ok(_) => self.broken = false,
            Err(e) => {
                tracing::debug!(conn_id = %self.id, endpoint = %self.endpoint, error = %e, "Connection marked broken");
                self.buf.clear();
            }
        }
        result
    }

    async fn round_trip(&mut self, args: &[&[u8]]) -> Result<Reply, ConnectionError> {
        self.stream.write_all(&encode_command(args)).await?;

        loop {
            if let Some((reply, used)) = parse_reply(&self.buf)? {
                self.buf.drain(..used);
                return Ok(reply);
            }

            let mut chunk = [0u8; 4096];
            let n = self.stream.read(&mut chunk).await?;
            if n == 0 {
                return Err(ConnectionError::Closed);
            }
            self.buf.extend_from_slice(&chunk[..n]);
        }
    }
}

impl Drop for RespConnection {
    fn drop(&mut self) {
        tracing::debug!(conn_id = %self.id, endpoint = %self.endpoint, "Connection released");
    }
}
