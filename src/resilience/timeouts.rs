//! Deadline enforcement.
//!
//! Every discovery and probe call is wrapped so a single cycle cannot block
//! indefinitely. Expiry is reported to callers as an ordinary failure.

use std::future::Future;
use std::time::Duration;

pub use tokio::time::error::Elapsed;

/// Run `fut` to completion or give up after `deadline`.
pub async fn with_deadline<F>(deadline: Duration, fut: F) -> Result<F::Output, Elapsed>
where
    F: Future,
{
    tokio::time::timeout(deadline, fut).await
}
