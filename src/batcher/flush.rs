//! Batch flushing logic.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;

use crate::error_handling::BatchError;
use crate::store::{BulkStore, InsertFuture};

use super::types::{CollectionOutcome, FlushHandle, FlushReport, WriteStatus};
use super::DocumentBatcher;

/// A bulk write that has been issued but not yet awaited.
struct IssuedWrite {
    collection: String,
    documents: usize,
    write: InsertFuture,
}

impl IssuedWrite {
    async fn settle(self, timeout: Option<Duration>) -> CollectionOutcome {
        let result = match timeout {
            Some(limit) => match tokio::time::timeout(limit, self.write).await {
                Ok(result) => result,
                Err(_) => {
                    log::warn!(
                        "Bulk write of {} documents to {} did not settle within {:?}",
                        self.documents,
                        self.collection,
                        limit
                    );
                    return CollectionOutcome {
                        collection: self.collection,
                        documents: self.documents,
                        status: WriteStatus::TimedOut(limit),
                    };
                }
            },
            None => self.write.await,
        };

        let status = match result {
            Ok(inserted) => WriteStatus::Inserted(inserted),
            Err(e) => {
                log::warn!(
                    "Bulk write of {} documents to {} failed: {}",
                    self.documents,
                    self.collection,
                    e
                );
                WriteStatus::Failed(e)
            }
        };

        CollectionOutcome {
            collection: self.collection,
            documents: self.documents,
            status,
        }
    }
}

impl<S: BulkStore> DocumentBatcher<S> {
    /// Saves and empties the document queue.
    ///
    /// Waits for any earlier flush to settle, then resets the admission
    /// counter, swaps the pending map for an empty one and issues one
    /// `insert_many` per collection. Returns as soon as the writes are issued;
    /// they settle in a background task that releases the flush lock.
    ///
    /// Store errors never propagate to the caller. If issuing a write fails,
    /// the error is logged, the lock is released right away and the swapped-out
    /// batch is dropped without being re-queued.
    ///
    /// Cancelling the returned future while it waits for the lock leaves the
    /// buffer untouched.
    pub async fn flush(&self) -> FlushHandle {
        let guard = Arc::clone(&self.flush_lock).lock_owned().await;

        let batch = {
            let mut state = self.state();
            state.admitted = 0;
            std::mem::take(&mut state.pending)
        };

        if batch.is_empty() {
            return FlushHandle::done(FlushReport::empty());
        }

        let mut issued: Vec<IssuedWrite> = Vec::with_capacity(batch.len());
        let mut remaining = batch.into_iter();
        let mut failure = None;

        for (collection, documents) in remaining.by_ref() {
            let count = documents.len();
            log::info!("Saving {} documents to {}", count, collection);
            match self.store.insert_many(&collection, documents) {
                Ok(write) => issued.push(IssuedWrite {
                    collection,
                    documents: count,
                    write,
                }),
                Err(e) => {
                    failure = Some((collection, count, e));
                    break;
                }
            }
        }

        if let Some((collection, count, error)) = failure {
            drop(guard);
            let discarded = count
                + issued.iter().map(|w| w.documents).sum::<usize>()
                + remaining.map(|(_, docs)| docs.len()).sum::<usize>();
            log::error!(
                "Error saving documents to {}: {}; discarded {} documents",
                collection,
                error,
                discarded
            );
            return FlushHandle::done(FlushReport::Aborted {
                collection,
                error,
                discarded,
            });
        }

        let settle_timeout = self.config.settle_timeout;
        let task = tokio::spawn(async move {
            let outcomes = join_all(issued.into_iter().map(|w| w.settle(settle_timeout))).await;
            drop(guard);

            let report = FlushReport::Settled(outcomes);
            if report.is_clean() {
                log::debug!(
                    "Flushed {} documents across {} collections",
                    report.inserted(),
                    report.outcomes().len()
                );
            } else {
                log::warn!(
                    "Flush settled: {} documents inserted, {} not confirmed",
                    report.inserted(),
                    report.failed_documents()
                );
            }
            report
        });

        FlushHandle::in_flight(task)
    }

    /// Flushes and waits for every write of this flush to settle.
    pub async fn flush_and_wait(&self) -> Result<FlushReport, BatchError> {
        self.flush().await.settled().await
    }
}
