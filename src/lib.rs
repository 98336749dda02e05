//! Derpi Fetcher Library
//!
//! A Rust library for downloading every image that matches a Derpibooru
//! search. A paginated search producer feeds a bounded queue that a pool of
//! download workers drains, while a progress aggregator keeps the running
//! count.

pub mod app;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;
pub mod prelude;

// Re-export commonly used types for convenience
pub use errors::{AppError, Result};

#[cfg(test)]
mod tests {
    use super::*;
    use constants::*;

    #[test]
    fn test_constants_accessible() {
        assert_eq!(DEFAULT_WORKER_COUNT, 100);
        assert_eq!(QUEUE_CAPACITY, 10);
        assert_eq!(PAGE_SIZE, 50);
        assert_eq!(DEFAULT_FILTER_ID, 56027);
        assert!(!USER_AGENT.is_empty());
    }

    #[test]
    fn test_error_types() {
        let download_error = errors::DownloadError::NotFound {
            url: "https://example.invalid/a.png".to_string(),
        };
        let app_error = AppError::Download(download_error);

        assert_eq!(app_error.category(), "download");
        assert!(!app_error.is_recoverable());
    }
}
