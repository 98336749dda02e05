//! Worker pool management and coordination
//!
//! A [`WorkerPool`] starts every worker at construction and owns their
//! join handles. The pool itself keeps no progress sender, so the progress
//! channel closes exactly when the last worker returns.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::config::WorkerConfig;
use super::core::DownloadWorker;
use super::types::{CompletionSignal, PoolSummary, ProgressEvent, WorkerStats};
use crate::app::client::SearchClient;
use crate::app::queue::QueueReceiver;
use crate::app::storage::Storage;
use crate::errors::QueueError;

/// Pool for managing multiple download workers
#[derive(Debug)]
pub struct WorkerPool {
    /// Worker task handles, indexed by worker id
    worker_handles: Vec<JoinHandle<WorkerStats>>,
}

impl WorkerPool {
    /// Start `config.worker_count` workers draining `queue`
    ///
    /// Each worker gets a clone of `progress_tx`; the original is dropped
    /// here.
    pub fn start(
        config: &WorkerConfig,
        client: Arc<SearchClient>,
        storage: Arc<Storage>,
        queue: QueueReceiver,
        progress_tx: mpsc::Sender<ProgressEvent>,
        cancel: CancellationToken,
    ) -> Self {
        info!("Starting {} workers", config.worker_count);

        let worker_handles = (0..config.worker_count)
            .map(|worker_id| {
                let worker = DownloadWorker::new(
                    worker_id as u32,
                    config.clone(),
                    client.clone(),
                    storage.clone(),
                    queue.clone(),
                    progress_tx.clone(),
                    cancel.clone(),
                );
                tokio::spawn(worker.run())
            })
            .collect();

        Self { worker_handles }
    }

    pub fn worker_count(&self) -> usize {
        self.worker_handles.len()
    }

    /// Wait for every worker to return and merge their statistics
    ///
    /// A panicked worker is logged and counted, not propagated.
    pub async fn join(self) -> PoolSummary {
        let mut summary = PoolSummary {
            workers: self.worker_handles.len(),
            ..Default::default()
        };

        for (worker_id, handle) in self.worker_handles.into_iter().enumerate() {
            match handle.await {
                Ok(stats) => summary.merge(&stats),
                Err(e) => {
                    let err = QueueError::WorkerPanic {
                        worker_id: worker_id as u32,
                    };
                    error!("{}: {}", err, e);
                    summary.panicked += 1;
                }
            }
        }

        debug!(
            "All {} workers finished ({} panicked)",
            summary.workers, summary.panicked
        );
        summary
    }

    /// Join the pool on a background task and fire the completion signal
    ///
    /// The signal is sent once, after the last worker has returned.
    pub fn spawn_completion(self) -> oneshot::Receiver<CompletionSignal> {
        let (done_tx, done_rx) = oneshot::channel();
        tokio::spawn(async move {
            let summary = self.join().await;
            if done_tx.send(CompletionSignal { summary }).is_err() {
                debug!("Completion receiver dropped before workers finished");
            }
        });
        done_rx
    }
}
