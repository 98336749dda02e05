//! Progress aggregation
//!
//! The aggregator owns the download count. It listens to two channels at
//! once: progress events from the workers and the pool's single completion
//! signal. The signal only fires after every worker has returned, and a
//! worker only returns after its sends went through, so once the signal is
//! seen every event is already buffered. The aggregator then drains the
//! buffer without waiting and declares the count final.
//!
//! If the event channel closes first, the aggregator still waits for the
//! signal before finishing, so the summary it returns is always complete.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::app::worker::{CompletionSignal, PoolSummary, ProgressEvent};

/// Observer of the running count, e.g. a terminal progress display
pub trait ProgressReporter: Send + Sync {
    /// Called after every counted download with the new total
    fn downloaded(&self, count: u64);

    /// Called once with the final total
    fn finished(&self, _count: u64) {}
}

/// Final state of the aggregator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateReport {
    /// Counted downloads
    pub count: u64,
    /// Pool totals carried by the completion signal, if it arrived
    pub summary: Option<PoolSummary>,
}

/// Merges progress events with the completion signal
pub struct ProgressAggregator {
    milestone_interval: u64,
    reporter: Option<Arc<dyn ProgressReporter>>,
    count: u64,
}

impl ProgressAggregator {
    pub fn new(milestone_interval: u64) -> Self {
        Self {
            milestone_interval: milestone_interval.max(1),
            reporter: None,
            count: 0,
        }
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Count one event
    fn record(&mut self) {
        self.count += 1;
        if self.count % self.milestone_interval == 0 {
            info!("Downloaded {} images.", self.count);
        }
        if let Some(reporter) = &self.reporter {
            reporter.downloaded(self.count);
        }
    }

    /// Count events until the pool completes, then drain and finish
    pub async fn run(
        mut self,
        mut events: mpsc::Receiver<ProgressEvent>,
        mut completion: oneshot::Receiver<CompletionSignal>,
    ) -> AggregateReport {
        let signal = loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(ProgressEvent) => self.record(),
                    None => {
                        debug!("Progress channel closed, waiting for completion signal");
                        break (&mut completion).await;
                    }
                },
                signal = &mut completion => break signal,
            }
        };

        while let Ok(ProgressEvent) = events.try_recv() {
            self.record();
        }

        let summary = match signal {
            Ok(CompletionSignal { summary }) => Some(summary),
            Err(_) => {
                warn!("Worker pool ended without a completion signal");
                None
            }
        };

        info!("Done! Downloaded {} images.", self.count);
        if let Some(reporter) = &self.reporter {
            reporter.finished(self.count);
        }

        AggregateReport {
            count: self.count,
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct Recorder {
        last: AtomicU64,
        finished: AtomicU64,
    }

    impl ProgressReporter for Recorder {
        fn downloaded(&self, count: u64) {
            self.last.store(count, Ordering::SeqCst);
        }

        fn finished(&self, count: u64) {
            self.finished.store(count, Ordering::SeqCst);
        }
    }

    /// Test drain after signal
    ///
    /// Verifies that events still buffered when the completion signal is
    /// already available are all counted.
    #[tokio::test]
    async fn test_buffered_events_counted_after_signal() {
        let (events_tx, events_rx) = mpsc::channel(10);
        let (done_tx, done_rx) = oneshot::channel();

        for _ in 0..7 {
            events_tx.send(ProgressEvent).await.unwrap();
        }
        done_tx
            .send(CompletionSignal {
                summary: PoolSummary {
                    workers: 2,
                    downloaded: 7,
                    ..Default::default()
                },
            })
            .unwrap();

        let report = ProgressAggregator::new(100).run(events_rx, done_rx).await;

        assert_eq!(report.count, 7);
        assert_eq!(report.summary.map(|s| s.downloaded), Some(7));
        drop(events_tx);
    }

    #[tokio::test]
    async fn test_waits_for_signal_after_channel_closes() {
        let (events_tx, events_rx) = mpsc::channel(10);
        let (done_tx, done_rx) = oneshot::channel();

        events_tx.send(ProgressEvent).await.unwrap();
        drop(events_tx);

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            let _ = done_tx.send(CompletionSignal {
                summary: PoolSummary::default(),
            });
        });

        let report = tokio::time::timeout(
            Duration::from_secs(5),
            ProgressAggregator::new(100).run(events_rx, done_rx),
        )
        .await
        .unwrap();

        assert_eq!(report.count, 1);
        assert!(report.summary.is_some());
    }

    /// Test bounded channel flow
    ///
    /// Verifies that more events than the channel holds are all counted
    /// while producers wait on a full buffer, and that the reporter sees
    /// every step and the final total.
    #[tokio::test]
    async fn test_many_events_through_small_buffer() {
        let (events_tx, events_rx) = mpsc::channel(2);
        let (done_tx, done_rx) = oneshot::channel();

        let producers: Vec<_> = (0..4)
            .map(|_| {
                let tx = events_tx.clone();
                tokio::spawn(async move {
                    for _ in 0..60 {
                        tx.send(ProgressEvent).await.unwrap();
                    }
                })
            })
            .collect();
        drop(events_tx);

        tokio::spawn(async move {
            for producer in producers {
                producer.await.unwrap();
            }
            let _ = done_tx.send(CompletionSignal {
                summary: PoolSummary::default(),
            });
        });

        let recorder = Arc::new(Recorder::default());
        let report = ProgressAggregator::new(100)
            .with_reporter(recorder.clone())
            .run(events_rx, done_rx)
            .await;

        assert_eq!(report.count, 240);
        assert_eq!(recorder.last.load(Ordering::SeqCst), 240);
        assert_eq!(recorder.finished.load(Ordering::SeqCst), 240);
    }

    #[tokio::test]
    async fn test_missing_signal() {
        let (events_tx, events_rx) = mpsc::channel(1);
        let (done_tx, done_rx) = oneshot::channel::<CompletionSignal>();
        drop(events_tx);
        drop(done_tx);

        let report = ProgressAggregator::new(100).run(events_rx, done_rx).await;
        assert_eq!(report.count, 0);
        assert!(report.summary.is_none());
    }
}
