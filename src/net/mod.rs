//! Network layer shared by the Sentinel and Redis adapters.
//!
//! # Data Flow
//! ```text
//! command args
//!     → resp.rs (encode as RESP array)
//!     → connection.rs (write under deadline, read until a full frame)
//!     → resp.rs (decode reply)
//!     → adapter maps Reply into DiscoveryError / ProbeError
//! ```
//!
//! # Design Decisions
//! - One command in flight per connection; no pipelining
//! - Every connect and every round trip carries its own deadline

pub mod connection;
pub mod resp;

pub use connection::{ConnectionError, ConnectionId, RespConnection};
pub use resp::Reply;
