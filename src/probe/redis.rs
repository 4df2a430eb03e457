//! Redis probe session.

use std::time::Duration;

use async_trait::async_trait;

use crate::discovery::Endpoint;
use crate::net::{Reply, RespConnection};
use crate::probe::{ProbeError, ProbeSession};

/// Session against one Redis master.
///
/// A broken connection is never reused: the next command opens a fresh one
/// to the same endpoint, so a late reply to a timed-out write cannot be
/// mistaken for the answer to a later one.
#[derive(Debug)]
pub struct RedisSession {
    conn: RespConnection,
    connect_timeout: Duration,
    operation_timeout: Duration,
}

impl RedisSession {
    /// Connect to `endpoint` and confirm it answers `PING`.
    pub async fn connect(
        endpoint: &Endpoint,
        connect_timeout: Duration,
        operation_timeout: Duration,
    ) -> Result<Self, ProbeError> {
        let conn = RespConnection::connect(endpoint, connect_timeout, operation_timeout).await?;
        let mut session = Self {
            conn,
            connect_timeout,
            operation_timeout,
        };
        session.ping().await?;
        Ok(session)
    }

    async fn request(&mut self, args: &[&[u8]]) -> Result<Reply, ProbeError> {
        if self.conn.is_broken() {
            let endpoint = self.conn.endpoint().clone();
            tracing::info!(endpoint = %endpoint, "Reconnecting after connection failure");
            self.conn =
                RespConnection::connect(&endpoint, self.connect_timeout, self.operation_timeout)
                    .await?;
        }
        Ok(self.conn.request(args).await?)
    }
}

#[async_trait]
impl ProbeSession for RedisSession {
    fn endpoint(&self) -> &Endpoint {
        self.conn.endpoint()
    }

    async fn write_with_expiry(
        &mut self,
        key: &str,
        value: &[u8],
        ttl_secs: u64,
    ) -> Result<(), ProbeError> {
        let ttl = ttl_secs.to_string();
        let args: [&[u8]; 5] = [b"SET", key.as_bytes(), value, b"EX", ttl.as_bytes()];
        expect_simple(self.request(&args).await?, "OK")
    }

    async fn ping(&mut self) -> Result<(), ProbeError> {
        let args: [&[u8]; 1] = [b"PING"];
        expect_simple(self.request(&args).await?, "PONG")
    }
}

fn expect_simple(reply: Reply, expected: &str) -> Result<(), ProbeError> {
    match reply {
        Reply::Simple(s) if s == expected => Ok(()),
        Reply::Error(msg) => Err(ProbeError::Rejected(msg)),
        other => Err(ProbeError::Connection(format!(
            "expected +{}, got {:?}",
            expected, other
        ))),
    }
}
