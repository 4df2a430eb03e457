//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Discovery / probe call:
//!     → timeouts.rs (enforce connect/operation deadline)
//!     → On resolution failure: backoff.rs (delay before the next attempt)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - Deadline expiry is a failed outcome, never a crash
//! - Default backoff is a fixed delay; exponential growth is opt-in

pub mod backoff;
pub mod timeouts;

pub use backoff::ReconnectBackoff;
