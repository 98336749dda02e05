//! Worker type definitions and data structures
//!
//! Progress events, the completion signal and the per-worker statistics
//! that are merged into a pool summary once every worker has returned.

use serde::{Deserialize, Serialize};

/// One artifact persisted (or, by policy, found already present)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent;

/// Sent exactly once, after every worker of the pool has returned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionSignal {
    pub summary: PoolSummary,
}

/// Result of processing one task successfully
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    /// The artifact was fetched and written
    Downloaded { bytes: u64 },
    /// The artifact was already on disk; nothing was fetched
    AlreadyPresent,
}

/// Counters kept by a single worker
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerStats {
    pub worker_id: u32,
    /// Artifacts written by this worker
    pub downloaded: u64,
    /// Tasks skipped because the artifact existed
    pub already_present: u64,
    /// Tasks given up on
    pub abandoned: u64,
    /// Failed attempts, including those later retried successfully
    pub failed_attempts: u64,
    pub bytes_written: u64,
    /// Sidecars that could not be written
    pub sidecar_failures: u64,
}

impl WorkerStats {
    pub fn new(worker_id: u32) -> Self {
        Self {
            worker_id,
            ..Default::default()
        }
    }

    /// Tasks this worker finished, whatever the outcome
    pub fn tasks_handled(&self) -> u64 {
        self.downloaded + self.already_present + self.abandoned
    }
}

/// Totals across every worker of a pool
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSummary {
    /// Workers started
    pub workers: usize,
    /// Workers that panicked instead of returning statistics
    pub panicked: usize,
    pub downloaded: u64,
    pub already_present: u64,
    pub abandoned: u64,
    pub failed_attempts: u64,
    pub bytes_written: u64,
    pub sidecar_failures: u64,
}

impl PoolSummary {
    /// Add one worker's counters
    pub fn merge(&mut self, stats: &WorkerStats) {
        self.downloaded += stats.downloaded;
        self.already_present += stats.already_present;
        self.abandoned += stats.abandoned;
        self.failed_attempts += stats.failed_attempts;
        self.bytes_written += stats.bytes_written;
        self.sidecar_failures += stats.sidecar_failures;
    }

    pub fn tasks_handled(&self) -> u64 {
        self.downloaded + self.already_present + self.abandoned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_merge() {
        let mut summary = PoolSummary {
            workers: 2,
            ..Default::default()
        };

        let mut first = WorkerStats::new(0);
        first.downloaded = 3;
        first.bytes_written = 300;
        first.failed_attempts = 2;

        let mut second = WorkerStats::new(1);
        second.already_present = 1;
        second.abandoned = 1;

        summary.merge(&first);
        summary.merge(&second);

        assert_eq!(summary.downloaded, 3);
        assert_eq!(summary.already_present, 1);
        assert_eq!(summary.abandoned, 1);
        assert_eq!(summary.failed_attempts, 2);
        assert_eq!(summary.bytes_written, 300);
        assert_eq!(summary.tasks_handled(), 5);
        assert_eq!(first.tasks_handled() + second.tasks_handled(), 5);
    }
}
