//! Configuration structures for the download coordinator
//!
//! Channel sizes, the search retry policy and the worker settings for one
//! run of the pipeline.

use serde::{Deserialize, Serialize};

use crate::app::retry::RetryPolicy;
use crate::app::worker::WorkerConfig;
use crate::constants::{progress, workers};
use crate::errors::{ConfigError, ConfigResult};

/// Configuration for the download coordinator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Capacity of the queue between the search producer and the workers
    pub queue_capacity: usize,
    /// Capacity of the progress event channel
    pub progress_buffer_size: usize,
    /// A milestone line is logged every this many downloads
    pub milestone_interval: u64,
    /// Retry policy for unusable search pages
    pub search_retry: RetryPolicy,
    /// Worker configuration
    pub worker: WorkerConfig,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            queue_capacity: workers::QUEUE_CAPACITY,
            progress_buffer_size: workers::PROGRESS_BUFFER_SIZE,
            milestone_interval: progress::MILESTONE_INTERVAL,
            search_retry: RetryPolicy::search_default(),
            worker: WorkerConfig::default(),
        }
    }
}

impl CoordinatorConfig {
    /// Create a new coordinator configuration with custom worker count
    pub fn with_worker_count(mut self, count: usize) -> Self {
        self.worker.worker_count = count;
        self
    }

    pub fn with_worker_config(mut self, worker: WorkerConfig) -> Self {
        self.worker = worker;
        self
    }

    pub fn with_search_retry(mut self, retry: RetryPolicy) -> Self {
        self.search_retry = retry;
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.queue_capacity == 0 {
            return Err(ConfigError::invalid(
                "coordinator.queue_capacity",
                self.queue_capacity,
                "Queue capacity cannot be zero",
            ));
        }

        if self.progress_buffer_size == 0 {
            return Err(ConfigError::invalid(
                "coordinator.progress_buffer_size",
                self.progress_buffer_size,
                "Progress buffer size cannot be zero",
            ));
        }

        if self.milestone_interval == 0 {
            return Err(ConfigError::invalid(
                "coordinator.milestone_interval",
                self.milestone_interval,
                "Milestone interval cannot be zero",
            ));
        }

        self.search_retry.validate("coordinator.search_retry")?;
        self.worker.validate()
    }
}
