//! Signal handling for graceful shutdown
//!
//! Ctrl-C and SIGTERM cancel the run's [`CancellationToken`]. The producer
//! stops fetching, workers finish the task in hand and stop dequeuing, and
//! the count of what was persisted is still reported.

use tokio::signal;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Cancel `token` on the first Ctrl-C or SIGTERM
///
/// Returns a handle to the background task that monitors for signals. The
/// task also ends, without cancelling, if the token is cancelled elsewhere.
pub fn cancel_on_shutdown_signal(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = signal::ctrl_c().await {
                warn!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                }
                Err(e) => {
                    warn!("Failed to install SIGTERM handler: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Received Ctrl+C, finishing downloads in progress");
            },
            _ = terminate => {
                info!("Received terminate signal, finishing downloads in progress");
            },
            _ = token.cancelled() => return,
        }

        token.cancel();
    })
}
