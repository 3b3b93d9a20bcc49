//! Batching buffer for bulk document writes.
//!
//! [`DocumentBatcher`] collects documents per destination collection and
//! flushes them through one `insert_many` call per collection. It provides:
//! - Advisory admission control ([`DocumentBatcher::admit`])
//! - Double buffering: a flush swaps out the pending map, so documents
//!   enqueued while writes are in flight start a fresh batch
//! - At most one flush in flight; later flushes queue in FIFO order until the
//!   previous flush's writes have settled

mod flush;
mod types;

#[cfg(test)]
pub(crate) mod test_helpers;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::BatcherConfig;
use crate::store::BulkStore;

pub use types::{CollectionOutcome, FlushHandle, FlushReport, WriteStatus};

/// Buffer contents guarded by one short critical section.
struct BufferState<D> {
    pending: HashMap<String, Vec<D>>,
    admitted: usize,
}

impl<D> Default for BufferState<D> {
    fn default() -> Self {
        BufferState {
            pending: HashMap::new(),
            admitted: 0,
        }
    }
}

/// Queues documents per collection for batched insertion via
/// [`BulkStore::insert_many`].
pub struct DocumentBatcher<S: BulkStore> {
    store: S,
    config: BatcherConfig,
    state: Mutex<BufferState<S::Document>>,
    /// Held from the start of a flush until all of its writes have settled
    flush_lock: Arc<tokio::sync::Mutex<()>>,
}

impl<S: BulkStore> DocumentBatcher<S> {
    /// Creates a batcher with the default admission limit (1000).
    pub fn new(store: S) -> Self {
        Self::with_config(store, BatcherConfig::default())
    }

    /// Creates a batcher with explicit settings.
    pub fn with_config(store: S, config: BatcherConfig) -> Self {
        DocumentBatcher {
            store,
            config,
            state: Mutex::new(BufferState::default()),
            flush_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    /// Returns true if one more root-level document may be queued.
    ///
    /// Admission succeeds while `admitted + 1 < limit` and counts the admitted
    /// document; a refusal leaves the counter unchanged. The counter is reset
    /// by [`flush`](Self::flush). This does not enqueue anything.
    pub fn admit(&self) -> bool {
        let mut state = self.state();
        if state.admitted + 1 < self.config.limit {
            state.admitted += 1;
            true
        } else {
            false
        }
    }

    /// Queues a document for `collection`, after any documents already queued
    /// for it. No capacity check is done here.
    pub fn enqueue(&self, collection: impl Into<String>, document: S::Document) {
        self.state()
            .pending
            .entry(collection.into())
            .or_default()
            .push(document);
    }

    /// Documents admitted since the last flush.
    pub fn admitted(&self) -> usize {
        self.state().admitted
    }

    /// Configured admission limit.
    pub fn limit(&self) -> usize {
        self.config.limit
    }

    /// Number of queued documents across all collections.
    pub fn pending_len(&self) -> usize {
        self.state().pending.values().map(Vec::len).sum()
    }

    /// Collections with queued documents, sorted by name.
    pub fn pending_collections(&self) -> Vec<String> {
        let mut names: Vec<String> = self.state().pending.keys().cloned().collect();
        names.sort();
        names
    }

    /// Returns true while a flush owns the flush lock.
    pub fn is_flushing(&self) -> bool {
        self.flush_lock.try_lock().is_err()
    }

    /// Waits until no flush is in flight.
    pub async fn wait_idle(&self) {
        let _idle = self.flush_lock.lock().await;
    }

    /// The store flushes are written to.
    pub fn store(&self) -> &S {
        &self.store
    }

    fn state(&self) -> MutexGuard<'_, BufferState<S::Document>> {
        // No code path panics while holding the guard; recover the data anyway
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::test_helpers::RecordingStore;
    use super::*;

    fn batcher_with_limit(limit: usize) -> DocumentBatcher<std::sync::Arc<RecordingStore>> {
        DocumentBatcher::with_config(RecordingStore::new(), BatcherConfig::with_limit(limit))
    }

    #[test]
    fn test_default_limit() {
        let batcher = DocumentBatcher::new(RecordingStore::new());
        assert_eq!(batcher.limit(), 1000);
        assert_eq!(batcher.admitted(), 0);
        assert!(!batcher.is_flushing());
    }

    #[test]
    fn test_admit_allows_limit_minus_one() {
        let batcher = batcher_with_limit(3);
        assert!(batcher.admit());
        assert!(batcher.admit());
        assert!(!batcher.admit());
        assert_eq!(batcher.admitted(), 2);
    }

    #[test]
    fn test_admit_nth_call_true_iff_n_below_limit() {
        let limit = 10;
        let batcher = batcher_with_limit(limit);
        for n in 1..=limit + 5 {
            let before = batcher.admitted();
            let admitted = batcher.admit();
            assert_eq!(admitted, n < limit, "call {}", n);
            if admitted {
                assert_eq!(batcher.admitted(), before + 1);
            } else {
                assert_eq!(batcher.admitted(), before);
            }
        }
        assert_eq!(batcher.admitted(), limit - 1);
    }

    #[test]
    fn test_admit_with_tiny_limits() {
        assert!(!batcher_with_limit(0).admit());
        assert!(!batcher_with_limit(1).admit());
        let two = batcher_with_limit(2);
        assert!(two.admit());
        assert!(!two.admit());
    }

    #[test]
    fn test_admit_does_not_enqueue() {
        let batcher = batcher_with_limit(5);
        assert!(batcher.admit());
        assert_eq!(batcher.pending_len(), 0);
    }

    #[test]
    fn test_enqueue_preserves_order_per_collection() {
        let batcher = batcher_with_limit(3);
        batcher.enqueue("users", 1);
        batcher.enqueue("orders", 10);
        batcher.enqueue("users", 2);

        let state = batcher.state();
        assert_eq!(state.pending["users"], vec![1, 2]);
        assert_eq!(state.pending["orders"], vec![10]);
    }

    #[test]
    fn test_enqueue_ignores_admission_limit() {
        let batcher = batcher_with_limit(1);
        assert!(!batcher.admit());
        for n in 0..50 {
            batcher.enqueue("events", n);
        }
        assert_eq!(batcher.pending_len(), 50);
        assert_eq!(batcher.admitted(), 0);
    }

    #[test]
    fn test_pending_collections_sorted() {
        let batcher = batcher_with_limit(3);
        batcher.enqueue("users", 1);
        batcher.enqueue("audit", 2);
        batcher.enqueue("orders", 3);
        assert_eq!(batcher.pending_collections(), vec!["audit", "orders", "users"]);
    }
}
