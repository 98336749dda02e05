//! Bounded work queue between the search producer and the download workers
//!
//! The queue is a fixed-capacity multi-consumer channel of [`SearchItem`]s.
//! A full queue suspends the producer, which is the pipeline's only
//! backpressure. The queue closes when every [`QueueSender`] has been
//! dropped; receivers then drain what is left and see `None`.
//!
//! # Basic Usage
//!
//! ```rust,no_run
//! use derpi_fetcher::app::{DownloadQueue, SearchItem};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let (tx, rx) = DownloadQueue::bounded(10);
//!
//! tx.send(SearchItem::from_json(r#"{"id":1}"#)?).await?;
//! drop(tx);
//!
//! while let Some(item) = rx.recv().await {
//!     println!("{}", item.raw_json());
//! }
//! # Ok(())
//! # }
//! ```

use crate::app::models::SearchItem;
use crate::errors::QueueError;

/// Constructor for the producer and consumer halves of the queue
pub struct DownloadQueue;

impl DownloadQueue {
    /// Create a queue holding at most `capacity` items
    ///
    /// A capacity of zero is raised to one so that sends can complete
    /// without a waiting receiver.
    pub fn bounded(capacity: usize) -> (QueueSender, QueueReceiver) {
        let (tx, rx) = flume::bounded(capacity.max(1));
        (QueueSender { tx }, QueueReceiver { rx })
    }
}

/// Producer half of the queue
#[derive(Debug, Clone)]
pub struct QueueSender {
    tx: flume::Sender<SearchItem>,
}

impl QueueSender {
    /// Enqueue one item, waiting while the queue is full
    ///
    /// # Errors
    ///
    /// Returns `QueueError::Closed` when every receiver is gone.
    pub async fn send(&self, item: SearchItem) -> Result<(), QueueError> {
        self.tx
            .send_async(item)
            .await
            .map_err(|_| QueueError::Closed)
    }

    /// Items currently buffered
    pub fn len(&self) -> usize {
        self.tx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.is_empty()
    }

    pub fn capacity(&self) -> Option<usize> {
        self.tx.capacity()
    }
}

/// Consumer half of the queue, shared by all workers
#[derive(Debug, Clone)]
pub struct QueueReceiver {
    rx: flume::Receiver<SearchItem>,
}

impl QueueReceiver {
    /// Take the next item, waiting while the queue is empty
    ///
    /// Returns `None` once the queue is closed and drained.
    pub async fn recv(&self) -> Option<SearchItem> {
        self.rx.recv_async().await.ok()
    }

    /// Items currently buffered
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}
