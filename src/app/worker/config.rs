//! Worker configuration management
//!
//! Configuration structures and validation for download workers.

use serde::{Deserialize, Serialize};

use crate::app::retry::RetryPolicy;
use crate::constants::workers;
use crate::errors::{ConfigError, ConfigResult};

/// What a worker does when the artifact is already on disk
///
/// Either way the file is left untouched and no request is made.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ExistingFilePolicy {
    /// Count the file as downloaded and emit a progress event
    #[default]
    #[value(name = "count")]
    #[serde(alias = "count")]
    CountAsDownloaded,
    /// Skip the file without counting it
    Ignore,
}

/// Configuration for download workers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Number of concurrent workers to spawn
    pub worker_count: usize,
    /// Retry budget and delay for each download task
    pub retry: RetryPolicy,
    /// Handling of artifacts that already exist
    pub existing_files: ExistingFilePolicy,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            worker_count: workers::DEFAULT_WORKER_COUNT,
            retry: RetryPolicy::download_default(),
            existing_files: ExistingFilePolicy::default(),
        }
    }
}

impl WorkerConfig {
    /// Validate configuration values and return errors for invalid settings
    pub fn validate(&self) -> ConfigResult<()> {
        if self.worker_count == 0 {
            return Err(ConfigError::invalid(
                "worker_count",
                self.worker_count,
                "Worker count cannot be zero",
            ));
        }

        if self.worker_count > workers::MAX_WORKER_COUNT {
            return Err(ConfigError::invalid(
                "worker_count",
                self.worker_count,
                format!("Worker count exceeds maximum ({})", workers::MAX_WORKER_COUNT),
            ));
        }

        self.retry.validate("worker.retry")
    }
}

/// Builder for WorkerConfig
#[derive(Debug, Default)]
pub struct WorkerConfigBuilder {
    config: WorkerConfig,
}

impl WorkerConfigBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of workers
    pub fn worker_count(mut self, count: usize) -> Self {
        self.config.worker_count = count;
        self
    }

    /// Set the per-task retry policy
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.config.retry = retry;
        self
    }

    pub fn existing_files(mut self, policy: ExistingFilePolicy) -> Self {
        self.config.existing_files = policy;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> ConfigResult<WorkerConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_worker_config_default() {
        let config = WorkerConfig::default();
        assert_eq!(config.worker_count, 100);
        assert_eq!(config.retry, RetryPolicy::download_default());
        assert_eq!(config.existing_files, ExistingFilePolicy::CountAsDownloaded);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_worker_count_bounds() {
        assert!(WorkerConfigBuilder::new().worker_count(0).build().is_err());
        assert!(WorkerConfigBuilder::new()
            .worker_count(workers::MAX_WORKER_COUNT + 1)
            .build()
            .is_err());

        let config = WorkerConfigBuilder::new()
            .worker_count(4)
            .retry(RetryPolicy::new(1, Duration::from_millis(5)))
            .existing_files(ExistingFilePolicy::Ignore)
            .build()
            .unwrap();
        assert_eq!(config.worker_count, 4);
        assert_eq!(config.existing_files, ExistingFilePolicy::Ignore);
    }

    #[test]
    fn test_existing_policy_names() {
        let policy: ExistingFilePolicy = serde_json::from_str("\"ignore\"").unwrap();
        assert_eq!(policy, ExistingFilePolicy::Ignore);

        let policy: ExistingFilePolicy = serde_json::from_str("\"count\"").unwrap();
        assert_eq!(policy, ExistingFilePolicy::CountAsDownloaded);

        let policy: ExistingFilePolicy =
            serde_json::from_str("\"count-as-downloaded\"").unwrap();
        assert_eq!(policy, ExistingFilePolicy::CountAsDownloaded);
    }
}
