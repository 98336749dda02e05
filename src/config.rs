//! Configuration management for Derpi Fetcher
//!
//! Settings come from built-in defaults, optionally overridden by a TOML
//! file, and finally by command-line flags. Every section is optional and
//! every field inside a section falls back to its default.
//!
//! ```toml
//! [search]
//! filter_id = 56027
//!
//! [client]
//! request_timeout = "2m"
//!
//! [coordinator]
//! queue_capacity = 10
//!
//! [coordinator.worker]
//! worker_count = 32
//! existing_files = "ignore"
//!
//! [coordinator.worker.retry]
//! max_retries = 5
//! delay = "1s"
//!
//! [output]
//! root = "downloads"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::app::{ClientConfig, CoordinatorConfig};
use crate::constants::{config as config_paths, files, search};
use crate::errors::{ConfigError, ConfigResult};

/// Unified application configuration for TOML serialization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Search defaults
    pub search: SearchConfig,
    /// HTTP client settings
    pub client: ClientConfig,
    /// Download coordinator settings
    pub coordinator: CoordinatorConfig,
    /// Where downloads are written
    pub output: OutputConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Search defaults applied when the command line does not override them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Server-side filter
    pub filter_id: u64,
    /// Results per page
    pub page_size: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            filter_id: search::DEFAULT_FILTER_ID,
            page_size: search::PAGE_SIZE,
        }
    }
}

/// Output location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root directory holding the per-author directories
    pub root: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(files::DEFAULT_OUTPUT_DIR),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log level for the application
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Runtime configuration for the client and the coordinator
    pub fn to_runtime_config(&self) -> (ClientConfig, CoordinatorConfig) {
        (self.client.clone(), self.coordinator.clone())
    }

    /// Check every section
    pub fn validate(&self) -> ConfigResult<()> {
        if self.search.page_size == 0 {
            return Err(ConfigError::invalid(
                "search.page_size",
                self.search.page_size,
                "Page size cannot be zero",
            ));
        }
        self.client.validate()?;
        self.coordinator.validate()
    }

    /// Load configuration with multi-source precedence:
    /// 1. Default values
    /// 2. Config file (if one exists)
    ///
    /// An explicitly named file must exist. Command-line overrides are
    /// applied by the caller.
    pub async fn load(config_file_override: Option<PathBuf>) -> ConfigResult<Self> {
        match Self::locate(config_file_override)? {
            Some(path) => Self::load_from_file(&path).await,
            None => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Resolve which configuration file [`AppConfig::load`] would read
    ///
    /// Returns `None` when no override is given and no standard location
    /// holds a file.
    pub fn locate(config_file_override: Option<PathBuf>) -> ConfigResult<Option<PathBuf>> {
        match config_file_override {
            Some(path) if !path.exists() => Err(ConfigError::NotFound { path }),
            Some(path) => Ok(Some(path)),
            None => Ok(Self::find_config_file()),
        }
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let mut search_paths = vec![PathBuf::from(config_paths::LOCAL_CONFIG_FILE)];
        if let Some(path) = Self::default_config_path() {
            search_paths.push(path);
        }

        search_paths.into_iter().find(|path| {
            let found = path.exists();
            if found {
                debug!("Found config file: {}", path.display());
            }
            found
        })
    }

    /// Get the default config file path for the current user
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| {
            dir.join(config_paths::CONFIG_DIR_NAME)
                .join(config_paths::CONFIG_FILE_NAME)
        })
    }

    /// Load configuration from a TOML file
    pub async fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let config: AppConfig = toml::from_str(&content)?;

        debug!("Parsed configuration file: {}", path.display());
        Ok(config)
    }
}
