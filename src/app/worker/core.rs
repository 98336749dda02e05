//! Core download worker implementation
//!
//! A [`DownloadWorker`] takes search results off the shared queue one at a
//! time and persists each of them before asking for the next. It exits when
//! the queue is closed and drained, or as soon as cancellation is observed
//! between tasks. A task that fails is retried on a fixed delay; once its
//! budget is spent the task is abandoned and the worker moves on.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use super::config::{ExistingFilePolicy, WorkerConfig};
use super::types::{ProgressEvent, TaskOutcome, WorkerStats};
use crate::app::client::SearchClient;
use crate::app::models::{DownloadTask, SearchItem};
use crate::app::queue::QueueReceiver;
use crate::app::storage::Storage;
use crate::errors::{DownloadError, DownloadResult};

/// Individual download worker
#[derive(Debug)]
pub struct DownloadWorker {
    /// Unique worker identifier
    id: u32,
    /// Worker configuration
    config: WorkerConfig,
    /// Shared HTTP client
    client: Arc<SearchClient>,
    /// Output tree
    storage: Arc<Storage>,
    /// Shared work queue
    queue: QueueReceiver,
    /// Progress reporting channel
    progress_tx: mpsc::Sender<ProgressEvent>,
    /// Stops the worker between tasks
    cancel: CancellationToken,
    /// Worker statistics
    stats: WorkerStats,
}

impl DownloadWorker {
    /// Create a new download worker
    pub fn new(
        id: u32,
        config: WorkerConfig,
        client: Arc<SearchClient>,
        storage: Arc<Storage>,
        queue: QueueReceiver,
        progress_tx: mpsc::Sender<ProgressEvent>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            id,
            config,
            client,
            storage,
            queue,
            progress_tx,
            cancel,
            stats: WorkerStats::new(id),
        }
    }

    /// Start the worker loop
    ///
    /// Returns the worker's statistics. The progress sender is dropped on
    /// return.
    pub async fn run(mut self) -> WorkerStats {
        debug!("Worker {} starting", self.id);

        loop {
            if self.cancel.is_cancelled() {
                debug!("Worker {} received shutdown signal", self.id);
                break;
            }

            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    debug!("Worker {} received shutdown signal", self.id);
                    break;
                }
                next = self.queue.recv() => next,
            };

            match next {
                Some(item) => self.process(item).await,
                None => break,
            }
        }

        debug!(
            "Worker {} finished: {} downloaded, {} already present, {} abandoned",
            self.id, self.stats.downloaded, self.stats.already_present, self.stats.abandoned
        );
        self.stats
    }

    /// Process one search result through to a final outcome
    async fn process(&mut self, item: SearchItem) {
        let record = match item.record().map_err(DownloadError::Record) {
            Ok(record) => record,
            Err(e) => {
                warn!("Worker {}: abandoning search result: {}", self.id, e);
                self.stats.abandoned += 1;
                return;
            }
        };

        let task = self.storage.plan(&record);
        let mut tracker = self.config.retry.tracker();

        loop {
            match self.attempt(&task, &item).await {
                Ok(TaskOutcome::Downloaded { bytes }) => {
                    self.stats.downloaded += 1;
                    self.stats.bytes_written += bytes;
                    self.report_progress().await;
                    return;
                }
                Ok(TaskOutcome::AlreadyPresent) => {
                    self.stats.already_present += 1;
                    if self.config.existing_files == ExistingFilePolicy::CountAsDownloaded {
                        self.report_progress().await;
                    }
                    return;
                }
                Err(e) => {
                    self.stats.failed_attempts += 1;

                    if e.is_permanent() {
                        warn!(
                            "Worker {}: abandoning image {} ({}): {}",
                            self.id, task.id, task.url, e
                        );
                        self.stats.abandoned += 1;
                        return;
                    }

                    warn!(
                        "Worker {}: attempt {} for image {} failed: {}",
                        self.id,
                        tracker.attempt(),
                        task.id,
                        e
                    );

                    // A dequeued task keeps its retry budget through cancellation
                    if !tracker.backoff().await {
                        error!(
                            "Worker {}: giving up on image {} after {} retries",
                            self.id,
                            task.id,
                            tracker.retries()
                        );
                        self.stats.abandoned += 1;
                        return;
                    }
                }
            }
        }
    }

    /// One attempt: existence check, fetch, persist, sidecar
    async fn attempt(&mut self, task: &DownloadTask, item: &SearchItem) -> DownloadResult<TaskOutcome> {
        if self.storage.contains(task).await {
            debug!(
                "Worker {}: {} already exists",
                self.id,
                task.file_path.display()
            );
            return Ok(TaskOutcome::AlreadyPresent);
        }

        let response = self.client.fetch_artifact(&task.url).await?;
        let bytes = self.storage.save_stream(task, response).await?;

        if let Err(e) = self.storage.write_sidecar(task, item.raw_json()).await {
            warn!(
                "Worker {}: failed to write {}: {}",
                self.id,
                task.sidecar_path.display(),
                e
            );
            self.stats.sidecar_failures += 1;
        }

        Ok(TaskOutcome::Downloaded { bytes })
    }

    async fn report_progress(&self) {
        if self.progress_tx.send(ProgressEvent).await.is_err() {
            debug!("Worker {}: progress receiver closed", self.id);
        }
    }
}
