//! Shared utilities for integration testing: loopback RESP servers.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use sentinel_failover_monitor::discovery::Endpoint;
use sentinel_failover_monitor::net::resp::parse_reply;
use sentinel_failover_monitor::net::Reply;

/// Start a RESP server answering each command with `handler`.
///
/// Returning `None` from the handler closes the connection.
pub async fn start_resp_server<F>(handler: F) -> SocketAddr
where
    F: Fn(&[Vec<u8>]) -> Option<Vec<u8>> + Send + Sync + 'static,
{
    start_delayed_resp_server(move |args| (Duration::ZERO, handler(args))).await
}

/// Like [`start_resp_server`], but each response is written after the
/// delay the handler returns alongside it.
pub async fn start_delayed_resp_server<F>(handler: F) -> SocketAddr
where
    F: Fn(&[Vec<u8>]) -> (Duration, Option<Vec<u8>>) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handler = Arc::new(handler);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let handler = handler.clone();
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                loop {
                    while let Ok(Some((frame, used))) = parse_reply(&buf) {
                        buf.drain(..used);
                        let Reply::Array(Some(items)) = frame else {
                            return;
                        };
                        let args: Vec<Vec<u8>> = items
                            .into_iter()
                            .filter_map(|item| match item {
                                Reply::Bulk(Some(bytes)) => Some(bytes),
                                _ => None,
                            })
                            .collect();
                        let (delay, response) = handler(&args);
                        if !delay.is_zero() {
                            tokio::time::sleep(delay).await;
                        }
                        match response {
                            Some(response) => {
                                if socket.write_all(&response).await.is_err() {
                                    return;
                                }
                            }
                            None => return,
                        }
                    }

                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                    }
                }
            });
        }
    });

    addr
}

pub fn endpoint(addr: SocketAddr) -> Endpoint {
    Endpoint::new(addr.ip().to_string(), addr.port())
}

fn command(args: &[Vec<u8>]) -> String {
    args.iter()
        .map(|a| String::from_utf8_lossy(a).to_uppercase())
        .take(2)
        .collect::<Vec<_>>()
        .join(" ")
}

fn bulk_array(items: &[&str]) -> Vec<u8> {
    let mut out = format!("*{}\r\n", items.len()).into_bytes();
    for item in items {
        out.extend_from_slice(format!("${}\r\n{}\r\n", item.len(), item).as_bytes());
    }
    out
}

/// Handle to a mock Sentinel whose reported master can be switched.
#[derive(Clone)]
pub struct MockSentinel {
    pub addr: SocketAddr,
    master: Arc<Mutex<Option<SocketAddr>>>,
}

impl MockSentinel {
    /// Start a sentinel monitoring `group`, reporting `master` (nil if `None`).
    pub async fn start(group: &'static str, master: Option<SocketAddr>) -> Self {
        let master = Arc::new(Mutex::new(master));
        let shared = master.clone();

        let addr = start_resp_server(move |args| {
            let current = *shared.lock().unwrap();
            let reply = match command(args).as_str() {
                "SENTINEL GET-MASTER-ADDR-BY-NAME" => {
                    let asked = args.get(2).map(|g| String::from_utf8_lossy(g).into_owned());
                    match current {
                        Some(master) if asked.as_deref() == Some(group) => bulk_array(&[
                            &master.ip().to_string(),
                            &master.port().to_string(),
                        ]),
                        _ => b"*-1\r\n".to_vec(),
                    }
                }
                "SENTINEL MASTERS" => {
                    let entry = bulk_array(&["name", group, "flags", "master"]);
                    let mut out = b"*1\r\n".to_vec();
                    out.extend_from_slice(&entry);
                    out
                }
                "PING" => b"+PONG\r\n".to_vec(),
                _ => b"-ERR unknown command\r\n".to_vec(),
            };
            Some(reply)
        })
        .await;

        Self { addr, master }
    }

    pub fn set_master(&self, master: Option<SocketAddr>) {
        *self.master.lock().unwrap() = master;
    }
}

/// Handle to a mock Redis server that can be demoted to a read-only replica.
#[derive(Clone)]
pub struct MockRedis {
    pub addr: SocketAddr,
    read_only: Arc<AtomicBool>,
    writes: Arc<Mutex<Vec<Vec<Vec<u8>>>>>,
}

impl MockRedis {
    pub async fn start() -> Self {
        let read_only = Arc::new(AtomicBool::new(false));
        let writes = Arc::new(Mutex::new(Vec::new()));
        let (ro, log) = (read_only.clone(), writes.clone());

        let addr = start_resp_server(move |args| {
            let reply = match command(args).split(' ').next().unwrap_or("") {
                "PING" => b"+PONG\r\n".to_vec(),
                "SET" if ro.load(Ordering::SeqCst) => {
                    b"-READONLY You can't write against a read only replica.\r\n".to_vec()
                }
                "SET" => {
                    log.lock().unwrap().push(args.to_vec());
                    b"+OK\r\n".to_vec()
                }
                _ => b"-ERR unknown command\r\n".to_vec(),
            };
            Some(reply)
        })
        .await;

        Self {
            addr,
            read_only,
            writes,
        }
    }

    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    /// Arguments of every accepted `SET`.
    pub fn writes(&self) -> Vec<Vec<Vec<u8>>> {
        self.writes.lock().unwrap().clone()
    }
}
