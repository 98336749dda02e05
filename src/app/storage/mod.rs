//! Local storage for downloaded images
//!
//! [`Storage`] owns the output root. It plans where each record lands,
//! answers whether an artifact is already present, and persists artifacts
//! and their metadata sidecars.
//!
//! Artifacts are streamed into a uniquely named `.tmp` file in the target
//! directory and renamed onto the final name
//! only once the body is complete, so an interrupted run never leaves a
//! truncated file that a later run would mistake for a finished download.
//!
//! # Examples
//!
//! ```rust,no_run
//! use derpi_fetcher::app::{SearchItem, Storage};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = Storage::new("downloads");
//! let item = SearchItem::from_json(r#"{"id":1,"representations":{"full":"https://x/1.png"},"tags":[]}"#)?;
//! let task = storage.plan(&item.record()?);
//! if !storage.contains(&task).await {
//!     println!("would download {} to {}", task.url, task.file_path.display());
//! }
//! # Ok(())
//! # }
//! ```

pub mod path;
mod writer;

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;

use crate::app::models::{DownloadTask, ImageRecord};
use crate::errors::DownloadResult;

pub use path::{author_directory, normalized_extension, PathGenerator};

/// Output directory tree for one run
#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Derive the directory, artifact path and sidecar path for a record
    pub fn plan(&self, record: &ImageRecord) -> DownloadTask {
        PathGenerator::task_for(&self.root, record)
    }

    /// Whether the artifact for this task is already on disk
    pub async fn contains(&self, task: &DownloadTask) -> bool {
        fs::metadata(&task.file_path).await.is_ok()
    }

    /// Stream a response body to the task's artifact path
    ///
    /// Creates the directory when missing. Returns the number of bytes
    /// written. On error no file is left at either the final or the
    /// temporary path.
    pub async fn save_stream(
        &self,
        task: &DownloadTask,
        response: reqwest::Response,
    ) -> DownloadResult<u64> {
        fs::create_dir_all(&task.directory).await?;
        let bytes = writer::write_atomic(&task.file_path, response.bytes_stream()).await?;
        debug!("Saved {} ({} bytes)", task.file_path.display(), bytes);
        Ok(bytes)
    }

    /// Write the raw record next to the artifact
    pub async fn write_sidecar(&self, task: &DownloadTask, raw_json: &str) -> std::io::Result<()> {
        fs::create_dir_all(&task.directory).await?;
        fs::write(&task.sidecar_path, raw_json.as_bytes()).await
    }
}
