//! Redis Sentinel discovery client.
//!
//! # Responsibilities
//! - Query each configured sentinel in order for the current master
//! - Distinguish "group unknown" from "sentinels unreachable"
//! - Open Redis sessions against the resolved master

use std::time::Duration;

use async_trait::async_trait;

use crate::config::{DiscoveryConfig, TimeoutConfig};
use crate::discovery::{ConnectivityReport, DiscoveryClient, DiscoveryError, Endpoint, EndpointParseError};
use crate::net::{ConnectionError, Reply, RespConnection};
use crate::probe::{ProbeError, RedisSession};

/// Discovery client talking to a list of sentinels.
#[derive(Debug, Clone)]
pub struct SentinelClient {
    sentinels: Vec<Endpoint>,
    connect_timeout: Duration,
    operation_timeout: Duration,
}

impl SentinelClient {
    pub fn new(sentinels: Vec<Endpoint>, timeouts: TimeoutConfig) -> Self {
        Self {
            sentinels,
            connect_timeout: timeouts.connect(),
            operation_timeout: timeouts.operation(),
        }
    }

    /// Build from configuration, failing on the first malformed address.
    pub fn from_config(
        discovery: &DiscoveryConfig,
        timeouts: TimeoutConfig,
    ) -> Result<Self, EndpointParseError> {
        let sentinels = discovery
            .sentinels
            .iter()
            .map(|s| s.parse())
            .collect::<Result<Vec<Endpoint>, _>>()?;
        Ok(Self::new(sentinels, timeouts))
    }

    async fn query(&self, sentinel: &Endpoint, args: &[&[u8]]) -> Result<Reply, ConnectionError> {
        let mut conn =
            RespConnection::connect(sentinel, self.connect_timeout, self.operation_timeout).await?;
        conn.request(args).await
    }
}

#[async_trait]
impl DiscoveryClient for SentinelClient {
    type Session = RedisSession;

    async fn resolve(&self, group: &str) -> Result<Endpoint, DiscoveryError> {
        let mut last_error: Option<String> = None;
        let mut not_found = false;

        for sentinel in &self.sentinels {
            let args: [&[u8]; 3] = [b"SENTINEL", b"GET-MASTER-ADDR-BY-NAME", group.as_bytes()];
            match self.query(sentinel, &args).await {
                Ok(reply) if reply.is_nil() => {
                    tracing::debug!(sentinel = %sentinel, group, "Sentinel does not know group");
                    not_found = true;
                }
                Ok(Reply::Array(Some(items))) => match parse_master_addr(&items) {
                    Some(endpoint) => {
                        tracing::debug!(sentinel = %sentinel, master = %endpoint, "Master resolved");
                        return Ok(endpoint);
                    }
                    None => {
                        tracing::warn!(sentinel = %sentinel, reply = ?items, "Malformed master address reply");
                        last_error = Some(format!("malformed reply from {}", sentinel));
                    }
                },
                Ok(Reply::Error(msg)) => {
                    tracing::warn!(sentinel = %sentinel, error = %msg, "Sentinel returned error");
                    last_error = Some(msg);
                }
                Ok(other) => {
                    tracing::warn!(sentinel = %sentinel, reply = ?other, "Unexpected sentinel reply");
                    last_error = Some(format!("unexpected reply from {}", sentinel));
                }
                Err(e) => {
                    tracing::warn!(sentinel = %sentinel, error = %e, "Sentinel unreachable, trying next");
                    last_error = Some(e.to_string());
                }
            }
        }

        if not_found {
            return Err(DiscoveryError::GroupNotFound(group.to_string()));
        }
        Err(DiscoveryError::Unavailable(
            last_error.unwrap_or_else(|| "no sentinels configured".to_string()),
        ))
    }

    async fn open_session(&self, endpoint: &Endpoint) -> Result<RedisSession, ProbeError> {
        RedisSession::connect(endpoint, self.connect_timeout, self.operation_timeout).await
    }

    async fn check_connectivity(&self) -> Result<ConnectivityReport, DiscoveryError> {
        let mut last_error: Option<String> = None;

        for sentinel in &self.sentinels {
            let args: [&[u8]; 2] = [b"SENTINEL", b"MASTERS"];
            match self.query(sentinel, &args).await {
                Ok(Reply::Array(Some(masters))) => {
                    return Ok(ConnectivityReport {
                        answered_by: sentinel.clone(),
                        groups: masters.iter().filter_map(master_name).collect(),
                    });
                }
                Ok(other) => {
                    tracing::warn!(sentinel = %sentinel, reply = ?other, "Unexpected SENTINEL MASTERS reply");
                    last_error = Some(format!("unexpected reply from {}", sentinel));
                }
                Err(e) => {
                    tracing::warn!(sentinel = %sentinel, error = %e, "Sentinel unreachable");
                    last_error = Some(e.to_string());
                }
            }
        }

        Err(DiscoveryError::Unavailable(
            last_error.unwrap_or_else(|| "no sentinels configured".to_string()),
        ))
    }
}

/// `[host, port]` as returned by `SENTINEL GET-MASTER-ADDR-BY-NAME`.
fn parse_master_addr(items: &[Reply]) -> Option<Endpoint> {
    let [host, port] = items else {
        return None;
    };
    let host = host.as_text()?;
    let port: u16 = port.as_text()?.parse().ok()?;
    Some(Endpoint::new(host, port))
}

/// Each `SENTINEL MASTERS` entry is a flat list of field/value pairs.
fn master_name(entry: &Reply) -> Option<String> {
    let Reply::Array(Some(fields)) = entry else {
        return None;
    };
    fields
        .chunks(2)
        .find(|pair| pair.len() == 2 && pair[0].as_text().as_deref() == Some("name"))
        .and_then(|pair| pair[1].as_text())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bulk(s: &str) -> Reply {
        Reply::Bulk(Some(s.as_bytes().to_vec()))
    }

    #[test]
    fn test_parse_master_addr() {
        assert_eq!(
            parse_master_addr(&[bulk("10.0.0.2"), bulk("6379")]),
            Some(Endpoint::new("10.0.0.2", 6379))
        );
        assert_eq!(parse_master_addr(&[bulk("10.0.0.2")]), None);
        assert_eq!(parse_master_addr(&[bulk("10.0.0.2"), bulk("port")]), None);
    }

    #[test]
    fn test_master_name_from_field_pairs() {
        let entry = Reply::Array(Some(vec![
            bulk("name"),
            bulk("mymaster"),
            bulk("ip"),
            bulk("10.0.0.1"),
        ]));
        assert_eq!(master_name(&entry), Some("mymaster".to_string()));
        assert_eq!(master_name(&Reply::Integer(1)), None);
    }

    #[tokio::test]
    async fn test_unreachable_sentinels_are_unavailable() {
        // Port 1 on loopback refuses connections.
        let client = SentinelClient::new(
            vec![Endpoint::new("127.0.0.1", 1)],
            TimeoutConfig {
                connect_ms: 200,
                operation_ms: 200,
            },
        );
        let err = client.resolve("mymaster").await.unwrap_err();
        assert!(matches!(err, DiscoveryError::Unavailable(_)));
    }

    #[test]
    fn test_from_config_rejects_malformed_address() {
        let discovery = DiscoveryConfig {
            sentinels: vec!["sentinel-a".into()],
            group_name: "mymaster".into(),
        };
        assert!(SentinelClient::from_config(&discovery, TimeoutConfig::default()).is_err());
    }
}
