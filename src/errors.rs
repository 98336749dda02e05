//! Error types for Derpi Fetcher
//!
//! Errors are grouped by the component that raises them. Each group knows
//! whether it is worth retrying, which is what the search producer and the
//! download workers use to pick between retry, abandon and stop.

use std::path::PathBuf;
use thiserror::Error;

/// Search API errors raised by the paginated producer
#[derive(Error, Debug)]
pub enum SearchError {
    /// The request never produced a response (DNS, connect, TLS, reset)
    #[error("Search request failed")]
    Transport(#[source] reqwest::Error),

    /// The server answered with a non-success status
    #[error("Search request returned HTTP {status}")]
    Status { status: u16 },

    /// The response body could not be read to the end
    #[error("Failed to read search response body")]
    Body(#[source] reqwest::Error),

    /// The response body was not a valid search page
    #[error("Search response decoding failed")]
    Decode(#[from] serde_json::Error),
}

impl SearchError {
    /// Transient errors are retried; anything else ends the search
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SearchError::Status { .. } | SearchError::Body(_) | SearchError::Decode(_)
        )
    }
}

/// Download and file persistence errors raised by workers
#[derive(Error, Debug)]
pub enum DownloadError {
    /// HTTP request error
    #[error("HTTP request failed")]
    Http(#[from] reqwest::Error),

    /// I/O error during file operations
    #[error("File I/O error")]
    Io(#[from] std::io::Error),

    /// Invalid URL provided
    #[error("Invalid URL: {url} - {error}")]
    InvalidUrl { url: String, error: String },

    /// Artifact does not exist on the server
    #[error("File not found: {url}")]
    NotFound { url: String },

    /// Access to the artifact was refused
    #[error("Access forbidden: {url}")]
    Forbidden { url: String },

    /// Server returned error status
    #[error("Server error: HTTP {status}")]
    ServerError { status: u16 },

    /// Search record could not be decoded into an image
    #[error("Couldn't decode image data")]
    Record(#[from] serde_json::Error),

    /// Atomic file operation failed
    #[error("Atomic file operation failed: could not rename {temp_path} to {final_path}")]
    AtomicOperationFailed {
        temp_path: PathBuf,
        final_path: PathBuf,
    },
}

impl DownloadError {
    /// Permanent errors abandon the task without spending the retry budget
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            DownloadError::NotFound { .. }
                | DownloadError::Forbidden { .. }
                | DownloadError::InvalidUrl { .. }
                | DownloadError::Record(_)
        )
    }
}

/// Work queue and coordination errors
#[derive(Error, Debug)]
pub enum QueueError {
    /// Every consumer of the queue has gone away
    #[error("Download queue closed")]
    Closed,

    /// Worker panic or unexpected termination
    #[error("Worker {worker_id} panicked or terminated unexpectedly")]
    WorkerPanic { worker_id: u32 },

    /// The search producer task panicked
    #[error("Search producer terminated unexpectedly")]
    ProducerPanic,
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Configuration file could not be read
    #[error("Failed to read configuration file: {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration format
    #[error("Invalid configuration format")]
    InvalidFormat(#[from] toml::de::Error),

    /// Missing required configuration field
    #[error("Missing required configuration field: {field}")]
    MissingField { field: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for {field}: {value}. {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    /// The HTTP client could not be constructed
    #[error("Failed to build HTTP client")]
    HttpClient(#[source] reqwest::Error),
}

impl ConfigError {
    /// Shorthand for an [`ConfigError::InvalidValue`]
    pub fn invalid(
        field: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Search error
    #[error(transparent)]
    Search(#[from] SearchError),

    /// Download error
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// Queue error
    #[error(transparent)]
    Queue(#[from] QueueError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Generic application error with context
    #[error("Application error: {message}")]
    Generic { message: String },
}

impl AppError {
    /// Create a generic application error with a message
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Check if the error is recoverable (transient)
    pub fn is_recoverable(&self) -> bool {
        match self {
            AppError::Search(e) => e.is_transient(),
            AppError::Download(e) => !e.is_permanent(),
            _ => false,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Search(_) => "search",
            AppError::Download(_) => "download",
            AppError::Queue(_) => "queue",
            AppError::Config(_) => "config",
            AppError::Generic { .. } => "generic",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Search result type alias
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Download result type alias
pub type DownloadResult<T> = std::result::Result<T, DownloadError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
