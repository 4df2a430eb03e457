//! OS signal handling.
//!
//! SIGINT and SIGTERM both request a graceful shutdown: the in-flight probe
//! finishes, final statistics are emitted, then the process exits.

use std::future::Future;

use tokio::task::JoinHandle;

use crate::lifecycle::Shutdown;

/// Wait for SIGINT or SIGTERM and return the signal name.
pub async fn wait_for_signal() -> &'static str {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = interrupt(tokio::signal::ctrl_c()) => "SIGINT",
                    _ = sigterm.recv() => "SIGTERM",
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Cannot install SIGTERM handler, listening for SIGINT only");
                interrupt(tokio::signal::ctrl_c()).await;
                "SIGINT"
            }
        }
    }

    #[cfg(not(unix))]
    {
        interrupt(tokio::signal::ctrl_c()).await;
        "SIGINT"
    }
}

/// Resolve when `listener` reports an interrupt.
///
/// A listener that fails to install never resolves; it is not a signal.
async fn interrupt<F>(listener: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = listener.await {
        tracing::error!(error = %e, "Cannot listen for SIGINT");
        std::future::pending::<()>().await;
    }
}

/// Spawn a task that triggers `shutdown` on the first signal.
pub fn spawn_signal_handler(shutdown: Shutdown) -> JoinHandle<()> {
    tokio::spawn(async move {
        let name = wait_for_signal().await;
        tracing::info!(signal = name, "Received signal, shutting down...");
        shutdown.trigger();
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_failed_listener_does_not_count_as_interrupt() {
        let failed = async { Err(std::io::Error::other("no signal driver")) };
        let waited = tokio::time::timeout(Duration::from_secs(3600), interrupt(failed)).await;
        assert!(waited.is_err());
    }

    #[tokio::test]
    async fn test_delivered_interrupt_resolves() {
        interrupt(async { Ok(()) }).await;
    }
}
