//! Core application logic for Derpi Fetcher
//!
//! This module contains the search client, the bounded download queue, the
//! paginated search producer, the download worker pool, local storage and
//! the coordinator that runs them together.
//!
//! # Examples
//!
//! ```rust,no_run
//! use derpi_fetcher::app::{SearchClient, SearchQuery};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = SearchClient::new()?;
//! let query = SearchQuery::new("artist:someone");
//!
//! for item in client.search_page(&query, 1).await? {
//!     let record = item.record()?;
//!     println!("{} -> {}", record.id, record.representations.full);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod coordinator;
pub mod models;
pub mod queue;
pub mod retry;
pub mod source;
pub mod storage;
pub mod worker;

// Re-export main public API
pub use client::{ClientConfig, SearchClient, SearchQuery};
pub use coordinator::{
    cancel_on_shutdown_signal, AggregateReport, Coordinator, CoordinatorConfig,
    ProgressAggregator, ProgressReporter, SessionResult,
};
pub use models::{DownloadTask, ImageRecord, Representations, SearchItem};
pub use queue::{DownloadQueue, QueueReceiver, QueueSender};
pub use retry::{RetryPolicy, RetryTracker};
pub use source::{QuerySource, SourceEnd, SourceReport};
pub use storage::Storage;
pub use worker::{
    CompletionSignal, ExistingFilePolicy, PoolSummary, ProgressEvent, WorkerConfig, WorkerPool,
    WorkerStats,
};
