//! Session results
//!
//! What one run of the pipeline produced: the aggregated count, the pool's
//! totals and the reason the search stopped.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::app::source::{SourceEnd, SourceReport};
use crate::app::worker::PoolSummary;

/// Final result of a download session
#[derive(Debug, Clone, Serialize)]
pub struct SessionResult {
    /// Downloads counted by the progress aggregator
    pub downloaded: u64,
    /// Totals merged from every worker
    pub pool: PoolSummary,
    /// How the search producer ended
    pub source: SourceReport,
    /// Start time of download session
    pub started_at: DateTime<Utc>,
    /// Time taken for the entire session
    #[serde(with = "humantime_serde")]
    pub duration: Duration,
}

impl SessionResult {
    /// Whether the search stopped on an error
    pub fn search_failed(&self) -> bool {
        self.source.end.is_failure()
    }

    /// Whether the run was cut short by cancellation
    pub fn cancelled(&self) -> bool {
        self.source.end == SourceEnd::Cancelled
    }

    /// Average write throughput in bytes per second
    pub fn bytes_per_second(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.pool.bytes_written as f64 / secs
        } else {
            0.0
        }
    }

    /// One-line human summary
    pub fn summary_line(&self) -> String {
        let mut line = format!(
            "{} downloaded, {} already present, {} failed from {} results in {:.1}s",
            self.pool.downloaded,
            self.pool.already_present,
            self.pool.abandoned,
            self.source.items_enqueued,
            self.duration.as_secs_f64()
        );
        if self.source.end != SourceEnd::Exhausted {
            line.push_str(&format!(" (search stopped: {})", self.source.end));
        }
        line
    }
}
