//! Flush outcome types.
//!
//! A flush returns a [`FlushHandle`] as soon as its bulk writes are issued.
//! Callers that care about the result await [`FlushHandle::settled`] to get a
//! [`FlushReport`] with one tagged outcome per collection.

use std::time::Duration;

use tokio::task::JoinHandle;

use crate::error_handling::{BatchError, StoreError};

/// How a single bulk write ended.
#[derive(Debug)]
pub enum WriteStatus {
    /// The store accepted the write and reported this many inserted documents.
    Inserted(u64),
    /// The write was issued but the store rejected it.
    Failed(StoreError),
    /// The write did not settle within the configured timeout.
    TimedOut(Duration),
}

/// Outcome of the bulk write issued for one collection.
#[derive(Debug)]
pub struct CollectionOutcome {
    /// Destination collection
    pub collection: String,
    /// Number of documents handed to the store
    pub documents: usize,
    /// How the write ended
    pub status: WriteStatus,
}

impl CollectionOutcome {
    /// True if the store confirmed the write.
    pub fn is_success(&self) -> bool {
        matches!(self.status, WriteStatus::Inserted(_))
    }
}

/// Summary of one flush cycle.
#[derive(Debug)]
pub enum FlushReport {
    /// Every issued write settled; one outcome per collection.
    Settled(Vec<CollectionOutcome>),
    /// Issuing the write for `collection` failed. The whole batch, including
    /// writes already issued for other collections, was discarded.
    Aborted {
        /// Collection whose write could not be issued
        collection: String,
        /// Error returned while issuing the write
        error: StoreError,
        /// Documents dropped from the buffer by this flush
        discarded: usize,
    },
}

impl FlushReport {
    pub(crate) fn empty() -> Self {
        FlushReport::Settled(Vec::new())
    }

    /// Per-collection outcomes; empty for an aborted flush.
    pub fn outcomes(&self) -> &[CollectionOutcome] {
        match self {
            FlushReport::Settled(outcomes) => outcomes,
            FlushReport::Aborted { .. } => &[],
        }
    }

    /// Outcome for one collection, if it took part in this flush.
    pub fn outcome(&self, collection: &str) -> Option<&CollectionOutcome> {
        self.outcomes().iter().find(|o| o.collection == collection)
    }

    /// Documents taken out of the buffer by this flush.
    pub fn total_documents(&self) -> usize {
        match self {
            FlushReport::Settled(outcomes) => outcomes.iter().map(|o| o.documents).sum(),
            FlushReport::Aborted { discarded, .. } => *discarded,
        }
    }

    /// Documents the store reported as inserted.
    pub fn inserted(&self) -> u64 {
        self.outcomes()
            .iter()
            .map(|o| match o.status {
                WriteStatus::Inserted(n) => n,
                _ => 0,
            })
            .sum()
    }

    /// Documents that were not confirmed as written.
    pub fn failed_documents(&self) -> usize {
        match self {
            FlushReport::Settled(outcomes) => outcomes
                .iter()
                .filter(|o| !o.is_success())
                .map(|o| o.documents)
                .sum(),
            FlushReport::Aborted { discarded, .. } => *discarded,
        }
    }

    /// True if every write of this flush succeeded.
    pub fn is_clean(&self) -> bool {
        match self {
            FlushReport::Settled(outcomes) => outcomes.iter().all(CollectionOutcome::is_success),
            FlushReport::Aborted { .. } => false,
        }
    }
}

/// Handle to a flush whose writes may still be in flight.
///
/// Dropping the handle does not cancel the writes; the flush lock is still
/// released once they settle.
#[derive(Debug)]
pub struct FlushHandle {
    inner: HandleInner,
}

#[derive(Debug)]
enum HandleInner {
    InFlight(JoinHandle<FlushReport>),
    Done(FlushReport),
}

impl FlushHandle {
    pub(crate) fn in_flight(task: JoinHandle<FlushReport>) -> Self {
        FlushHandle {
            inner: HandleInner::InFlight(task),
        }
    }

    pub(crate) fn done(report: FlushReport) -> Self {
        FlushHandle {
            inner: HandleInner::Done(report),
        }
    }

    /// Returns true once every write of this flush has settled.
    pub fn is_settled(&self) -> bool {
        match &self.inner {
            HandleInner::InFlight(task) => task.is_finished(),
            HandleInner::Done(_) => true,
        }
    }

    /// Waits for all writes of this flush to settle.
    ///
    /// # Errors
    ///
    /// Returns `BatchError::SettlementTask` if the background task panicked.
    pub async fn settled(self) -> Result<FlushReport, BatchError> {
        match self.inner {
            HandleInner::InFlight(task) => Ok(task.await?),
            HandleInner::Done(report) => Ok(report),
        }
    }
}
