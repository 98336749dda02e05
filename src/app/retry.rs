//! Bounded fixed-delay retry policy
//!
//! The search producer and the download workers each carry their own
//! [`RetryPolicy`]. A policy is a pair of numbers; the mutable counter lives in
//! a [`RetryTracker`] created per retried operation, so one policy can be
//! shared by every worker without coordination.
//!
//! # Examples
//!
//! ```rust,no_run
//! use derpi_fetcher::app::RetryPolicy;
//!
//! # async fn example() {
//! let mut tracker = RetryPolicy::download_default().tracker();
//! loop {
//!     let succeeded = false; // perform the operation here
//!     if succeeded || !tracker.backoff().await {
//!         break;
//!     }
//! }
//! # }
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::constants::{search, workers};
use crate::errors::ConfigError;

/// Maximum retry count and the fixed delay slept before each retry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt
    pub max_retries: u32,
    /// Delay slept before every retry
    #[serde(with = "humantime_serde")]
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    /// Policy used for undecodable search pages (5 retries, 5 s apart)
    pub fn search_default() -> Self {
        Self::new(search::MAX_DECODE_RETRIES, search::DECODE_RETRY_DELAY)
    }

    /// Policy used for failed downloads (5 retries, 1 s apart)
    pub fn download_default() -> Self {
        Self::new(workers::MAX_RETRIES, workers::RETRY_DELAY)
    }

    /// Start counting retries for one operation
    pub fn tracker(&self) -> RetryTracker {
        RetryTracker {
            policy: *self,
            retries: 0,
        }
    }

    /// Total attempts this policy permits, including the first
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    pub fn validate(&self, field: &str) -> Result<(), ConfigError> {
        if self.delay > Duration::from_secs(3600) {
            return Err(ConfigError::invalid(
                format!("{}.delay", field),
                format!("{:?}", self.delay),
                "Retry delay must not exceed one hour",
            ));
        }
        Ok(())
    }
}

/// Retry counter for a single operation
#[derive(Debug, Clone)]
pub struct RetryTracker {
    policy: RetryPolicy,
    retries: u32,
}

impl RetryTracker {
    /// Retries consumed so far
    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Attempt number of the next try, starting at 1
    pub fn attempt(&self) -> u32 {
        self.retries + 1
    }

    /// Forget earlier failures after a success
    pub fn reset(&mut self) {
        self.retries = 0;
    }

    /// Record a failure. Sleeps and returns `true` while retries remain,
    /// returns `false` immediately once the budget is spent.
    pub async fn backoff(&mut self) -> bool {
        if self.retries >= self.policy.max_retries {
            return false;
        }
        self.retries += 1;
        tokio::time::sleep(self.policy.delay).await;
        true
    }

    /// Same as [`RetryTracker::backoff`], but gives up as soon as `cancel` fires
    pub async fn backoff_unless_cancelled(&mut self, cancel: &CancellationToken) -> bool {
        if cancel.is_cancelled() || self.retries >= self.policy.max_retries {
            return false;
        }
        self.retries += 1;
        tokio::select! {
            biased;
            _ = cancel.cancelled() => false,
            _ = tokio::time::sleep(self.policy.delay) => true,
        }
    }
}
