//! Paginated search producer
//!
//! [`QuerySource`] walks the result pages of one query in order and feeds
//! every result, one at a time, into the download queue. It stops on the
//! first empty page, on cancellation, when a request gets no response at
//! all, or when a page keeps failing after its retry budget. Whatever the
//! reason, the queue sender is dropped on return so the workers can drain
//! and exit.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::app::client::{SearchClient, SearchQuery};
use crate::app::queue::QueueSender;
use crate::app::retry::RetryPolicy;
use crate::constants::search;

/// Why production stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceEnd {
    /// An empty page was returned
    Exhausted,
    /// The cancellation token fired
    Cancelled,
    /// A search request got no response
    TransportFailed,
    /// A page stayed unusable after every retry
    RetriesExhausted,
    /// No worker is left to consume the queue
    QueueClosed,
}

impl SourceEnd {
    /// Whether the search ended on an error rather than by design
    pub fn is_failure(&self) -> bool {
        matches!(self, SourceEnd::TransportFailed | SourceEnd::RetriesExhausted)
    }
}

impl fmt::Display for SourceEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            SourceEnd::Exhausted => "all results fetched",
            SourceEnd::Cancelled => "cancelled",
            SourceEnd::TransportFailed => "search request failed",
            SourceEnd::RetriesExhausted => "search response unusable after retries",
            SourceEnd::QueueClosed => "download queue closed",
        };
        f.write_str(reason)
    }
}

/// Outcome of one producer run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceReport {
    /// Pages successfully decoded, including the final empty one
    pub pages_fetched: u32,
    /// Results handed to the queue
    pub items_enqueued: u64,
    pub end: SourceEnd,
}

/// Producer of search results for one query
#[derive(Debug)]
pub struct QuerySource {
    client: Arc<SearchClient>,
    query: SearchQuery,
    retry: RetryPolicy,
}

impl QuerySource {
    pub fn new(client: Arc<SearchClient>, query: SearchQuery, retry: RetryPolicy) -> Self {
        Self {
            client,
            query,
            retry,
        }
    }

    /// Run the producer on its own task
    pub fn spawn(self, sender: QueueSender, cancel: CancellationToken) -> JoinHandle<SourceReport> {
        tokio::spawn(self.run(sender, cancel))
    }

    /// Fetch pages until the results end, enqueueing each result
    ///
    /// Consumes `sender`; the queue closes when this returns and no other
    /// sender is alive.
    pub async fn run(self, sender: QueueSender, cancel: CancellationToken) -> SourceReport {
        let mut page = search::FIRST_PAGE;
        let mut tracker = self.retry.tracker();
        let mut pages_fetched = 0u32;
        let mut items_enqueued = 0u64;

        info!("Searching for \"{}\"", self.query.text);

        let end = 'pages: loop {
            if cancel.is_cancelled() {
                break SourceEnd::Cancelled;
            }

            let items = match self.client.search_page(&self.query, page).await {
                Ok(items) => items,
                Err(e) if e.is_transient() => {
                    warn!(
                        "Search page {} unusable (attempt {}): {}",
                        page,
                        tracker.attempt(),
                        e
                    );
                    if tracker.backoff_unless_cancelled(&cancel).await {
                        continue;
                    }
                    if cancel.is_cancelled() {
                        break SourceEnd::Cancelled;
                    }
                    error!("Giving up on search page {} after {} retries", page, tracker.retries());
                    break SourceEnd::RetriesExhausted;
                }
                Err(e) => {
                    error!("Search request for page {} failed: {}", page, e);
                    break SourceEnd::TransportFailed;
                }
            };

            tracker.reset();
            pages_fetched += 1;

            if items.is_empty() {
                debug!("Page {} is empty, search complete", page);
                break SourceEnd::Exhausted;
            }

            debug!("Page {} returned {} results", page, items.len());
            page += 1;

            for item in items {
                if cancel.is_cancelled() {
                    break 'pages SourceEnd::Cancelled;
                }

                let sent = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break 'pages SourceEnd::Cancelled,
                    sent = sender.send(item) => sent,
                };

                if sent.is_err() {
                    warn!("Download queue closed while searching");
                    break 'pages SourceEnd::QueueClosed;
                }
                items_enqueued += 1;
            }
        };

        drop(sender);
        info!(
            "Search finished ({}): {} results from {} pages",
            end, items_enqueued, pages_fetched
        );

        SourceReport {
            pages_fetched,
            items_enqueued,
            end,
        }
    }
}
