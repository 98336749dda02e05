//! Download worker system for concurrent image persistence
//!
//! A fixed number of workers drain the bounded download queue in parallel.
//! Each successful download is reported as one [`ProgressEvent`]; when the
//! last worker has returned the pool fires a single [`CompletionSignal`].
//!
//! # Module Organization
//!
//! - [`config`] - Worker configuration and the existing-file policy
//! - [`types`] - Progress events, completion signal and statistics
//! - [`core`] - Individual worker implementation with retry logic
//! - [`pool`] - Worker pool startup and completion
//!
//! # Basic Usage
//!
//! ```rust,no_run
//! use derpi_fetcher::app::worker::{WorkerConfig, WorkerPool};
//! use derpi_fetcher::app::{DownloadQueue, SearchClient, Storage};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(SearchClient::new()?);
//! let storage = Arc::new(Storage::new("downloads"));
//! let (queue_tx, queue_rx) = DownloadQueue::bounded(10);
//! let (progress_tx, mut progress_rx) = tokio::sync::mpsc::channel(10);
//!
//! let pool = WorkerPool::start(
//!     &WorkerConfig::default(),
//!     client,
//!     storage,
//!     queue_rx,
//!     progress_tx,
//!     CancellationToken::new(),
//! );
//! drop(queue_tx);
//!
//! let done = pool.spawn_completion();
//! while progress_rx.recv().await.is_some() {}
//! let signal = done.await?;
//! println!("{} downloaded", signal.summary.downloaded);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod pool;
pub mod types;

pub use config::{ExistingFilePolicy, WorkerConfig, WorkerConfigBuilder};
pub use self::core::DownloadWorker;
pub use pool::WorkerPool;
pub use types::{CompletionSignal, PoolSummary, ProgressEvent, TaskOutcome, WorkerStats};
