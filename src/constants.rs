//! Application constants for Derpi Fetcher
//!
//! This module centralizes all constants used throughout the application,
//! organized by functional domain for maintainability and clarity.

use std::time::Duration;

/// Search API endpoint and pagination constants
pub mod search {
    use super::Duration;

    /// Derpibooru API base URL
    pub const BASE_URL: &str = "https://derpibooru.org";

    /// Path of the image search endpoint
    pub const SEARCH_PATH: &str = "/api/v1/json/search/images";

    /// Number of results requested per page
    pub const PAGE_SIZE: u32 = 50;

    /// Pages are numbered from one
    pub const FIRST_PAGE: u32 = 1;

    /// Default filter ID ("Everything"; 100073 is the site's "Default" filter)
    pub const DEFAULT_FILTER_ID: u64 = 56027;

    /// Retries allowed for an undecodable search response
    pub const MAX_DECODE_RETRIES: u32 = 5;

    /// Fixed delay between search response retries
    pub const DECODE_RETRY_DELAY: Duration = Duration::from_secs(5);
}

/// HTTP client configuration constants
pub mod http {
    use super::Duration;

    /// Default user agent for all HTTP requests
    pub const USER_AGENT: &str = concat!("Derpi-Fetcher/", env!("CARGO_PKG_VERSION"));

    /// TCP keep-alive interval
    pub const TCP_KEEPALIVE: Duration = Duration::from_secs(30);

    /// Connection pool idle timeout
    pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

    /// Maximum idle connections kept per host
    pub const POOL_MAX_PER_HOST: usize = 32;
}

/// Worker and concurrency configuration
pub mod workers {
    use super::Duration;

    /// Default number of download workers
    pub const DEFAULT_WORKER_COUNT: usize = 100;

    /// Upper bound accepted for the worker count
    pub const MAX_WORKER_COUNT: usize = 1024;

    /// Capacity of the download queue between the search producer and the workers
    pub const QUEUE_CAPACITY: usize = 10;

    /// Buffer size of the progress event channel
    pub const PROGRESS_BUFFER_SIZE: usize = 10;

    /// Retries allowed per download task
    pub const MAX_RETRIES: u32 = 5;

    /// Fixed delay between download attempts
    pub const RETRY_DELAY: Duration = Duration::from_secs(1);
}

/// Output naming rules
pub mod naming {
    /// Tag prefix identifying an author tag
    pub const AUTHOR_TAG_PREFIX: &str = "artist:";

    /// Separator placed between author names in a directory name
    pub const AUTHOR_SEPARATOR: &str = "-&-";

    /// Maximum directory name length, in characters
    pub const MAX_DIRECTORY_NAME_CHARS: usize = 200;

    /// Directory used when no author tag is present
    pub const UNKNOWN_AUTHOR_DIRECTORY: &str = "unknown";

    /// Replacement for path separators found inside author names
    pub const SEPARATOR_REPLACEMENT: char = '_';

    /// Extension alias collapsed onto its canonical form
    pub const JPEG_ALIAS: &str = ".jpeg";

    /// Canonical JPEG extension
    pub const JPEG_CANONICAL: &str = ".jpg";
}

/// File operation constants
pub mod files {
    /// Temporary file suffix for atomic operations
    pub const TEMP_FILE_SUFFIX: &str = ".tmp";

    /// Extension of the metadata sidecar written next to each artifact
    pub const SIDECAR_EXTENSION: &str = "json";

    /// Default output directory
    pub const DEFAULT_OUTPUT_DIR: &str = ".";
}

/// Progress reporting
pub mod progress {
    /// A milestone line is logged every this many counted downloads
    pub const MILESTONE_INTERVAL: u64 = 100;
}

/// Configuration file locations
pub mod config {
    /// Project-local configuration file name
    pub const LOCAL_CONFIG_FILE: &str = "derpi-fetcher.toml";

    /// Directory under the user's config dir
    pub const CONFIG_DIR_NAME: &str = "derpi-fetcher";

    /// Configuration file name inside the user's config dir
    pub const CONFIG_FILE_NAME: &str = "config.toml";
}

// Re-export commonly used constants for convenience
pub use http::USER_AGENT;
pub use search::{DEFAULT_FILTER_ID, PAGE_SIZE};
pub use workers::{DEFAULT_WORKER_COUNT, QUEUE_CAPACITY};
