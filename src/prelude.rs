//! Prelude module for Derpi Fetcher Library
//!
//! Re-exports the items most integrations need, so a single
//! `use derpi_fetcher::prelude::*;` is enough to run a download.
//!
//! # Usage
//!
//! ```rust,no_run
//! use derpi_fetcher::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = Arc::new(SearchClient::new()?);
//!     let storage = Arc::new(Storage::new("downloads"));
//!     let coordinator = Coordinator::new(CoordinatorConfig::default(), client, storage);
//!
//!     let result = coordinator
//!         .run(SearchQuery::new("artist:someone"), CancellationToken::new())
//!         .await?;
//!     println!("{}", result.summary_line());
//!     Ok(())
//! }
//! ```

// Core result types
pub use crate::errors::{AppError, Result};

// Pipeline components
pub use crate::app::{
    ClientConfig, Coordinator, CoordinatorConfig, ExistingFilePolicy, RetryPolicy, SearchClient,
    SearchQuery, SessionResult, Storage, WorkerConfig,
};

// Commonly used constants
pub use crate::constants::{DEFAULT_FILTER_ID, DEFAULT_WORKER_COUNT, QUEUE_CAPACITY, USER_AGENT};

pub use std::path::{Path, PathBuf};
pub use std::sync::Arc;

pub use tokio;
pub use tokio_util::sync::CancellationToken;
