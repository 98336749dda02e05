//! Download orchestration and progress coordination
//!
//! The coordinator wires one run of the pipeline together:
//!
//! ```text
//! QuerySource ──▶ DownloadQueue ──▶ WorkerPool (N workers) ──▶ ProgressAggregator
//!                   (bounded)                 │                      ▲
//!                                             └── CompletionSignal ──┘
//! ```
//!
//! Every stage talks to the next through a bounded channel, and every
//! channel closes when its senders are gone: the producer's return closes
//! the queue, the last worker's return closes the progress channel, and the
//! pool's join fires the completion signal.
//!
//! # Architecture
//!
//! - [`config`] - Configuration structures and validation
//! - [`progress`] - Progress aggregation and the reporter hook
//! - [`signals`] - Signal handling for graceful shutdown
//! - [`stats`] - Session results
//!
//! # Examples
//!
//! ```rust,no_run
//! use derpi_fetcher::app::{Coordinator, CoordinatorConfig, SearchClient, SearchQuery, Storage};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(SearchClient::new()?);
//! let storage = Arc::new(Storage::new("downloads"));
//! let config = CoordinatorConfig::default().with_worker_count(8);
//!
//! let coordinator = Coordinator::new(config, client, storage);
//! let result = coordinator
//!     .run(SearchQuery::new("artist:someone"), CancellationToken::new())
//!     .await?;
//! println!("Downloaded {} images", result.downloaded);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod progress;
pub mod signals;
pub mod stats;

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::app::client::{SearchClient, SearchQuery};
use crate::app::queue::DownloadQueue;
use crate::app::source::QuerySource;
use crate::app::storage::Storage;
use crate::app::worker::WorkerPool;
use crate::errors::{QueueError, Result};

pub use config::CoordinatorConfig;
pub use progress::{AggregateReport, ProgressAggregator, ProgressReporter};
pub use signals::cancel_on_shutdown_signal;
pub use stats::SessionResult;

/// Main coordinator for one search-and-download run
pub struct Coordinator {
    config: CoordinatorConfig,
    client: Arc<SearchClient>,
    storage: Arc<Storage>,
    reporter: Option<Arc<dyn ProgressReporter>>,
}

impl Coordinator {
    /// Create a new coordinator with the given configuration and shared components
    pub fn new(config: CoordinatorConfig, client: Arc<SearchClient>, storage: Arc<Storage>) -> Self {
        Self {
            config,
            client,
            storage,
            reporter: None,
        }
    }

    /// Mirror the running count to a reporter
    pub fn with_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Run the complete pipeline for `query`
    ///
    /// Returns once the search has ended, every worker has returned and the
    /// count is final. Cancelling `cancel` stops the search and makes the
    /// workers stop taking new items; downloads in flight are finished.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the search
    /// producer panicked. A search that ends on a request failure is not an
    /// error here; it is reported through [`SessionResult::search_failed`].
    pub async fn run(&self, query: SearchQuery, cancel: CancellationToken) -> Result<SessionResult> {
        self.config.validate()?;

        let started_at = Utc::now();
        let session_start = Instant::now();
        info!(
            "Starting download coordination with {} workers",
            self.config.worker.worker_count
        );

        let (queue_tx, queue_rx) = DownloadQueue::bounded(self.config.queue_capacity);
        let (progress_tx, progress_rx) = mpsc::channel(self.config.progress_buffer_size);

        let pool = WorkerPool::start(
            &self.config.worker,
            self.client.clone(),
            self.storage.clone(),
            queue_rx,
            progress_tx,
            cancel.clone(),
        );
        let completion = pool.spawn_completion();

        let source = QuerySource::new(self.client.clone(), query, self.config.search_retry)
            .spawn(queue_tx, cancel);

        let mut aggregator = ProgressAggregator::new(self.config.milestone_interval);
        if let Some(reporter) = &self.reporter {
            aggregator = aggregator.with_reporter(reporter.clone());
        }
        let report = aggregator.run(progress_rx, completion).await;

        let source = source.await.map_err(|e| {
            error!("Search producer failed: {}", e);
            QueueError::ProducerPanic
        })?;

        Ok(SessionResult {
            downloaded: report.count,
            pool: report.summary.unwrap_or_default(),
            source,
            started_at,
            duration: session_start.elapsed(),
        })
    }
}
