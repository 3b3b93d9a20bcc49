//! Shared test helpers for batcher tests.
//!
//! [`RecordingStore`] records every bulk write it is asked to issue and lets a
//! test control how each write behaves: succeed, reject, hang, fail to issue,
//! or wait behind a gate until the test opens it.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use tokio::sync::watch;

use crate::error_handling::StoreError;
use crate::store::{BulkStore, InsertFuture};

/// One `insert_many` call as seen by the store.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub collection: String,
    pub documents: Vec<u32>,
    pub issued_at: Instant,
}

#[derive(Default)]
struct Behaviour {
    refuse_issue: HashSet<String>,
    reject_write: HashSet<String>,
    hang_write: HashSet<String>,
}

/// Instrumented in-memory store.
pub struct RecordingStore {
    calls: Mutex<Vec<RecordedCall>>,
    settled_at: Arc<Mutex<Vec<Instant>>>,
    behaviour: Mutex<Behaviour>,
    gate: watch::Sender<bool>,
}

impl RecordingStore {
    /// A store whose writes succeed immediately.
    pub fn new() -> Arc<Self> {
        let (gate, _) = watch::channel(true);
        Arc::new(RecordingStore {
            calls: Mutex::new(Vec::new()),
            settled_at: Arc::new(Mutex::new(Vec::new())),
            behaviour: Mutex::new(Behaviour::default()),
            gate,
        })
    }

    /// A store whose writes block until [`open_gate`](Self::open_gate).
    pub fn gated() -> Arc<Self> {
        let store = Self::new();
        store.gate.send_replace(false);
        store
    }

    pub fn open_gate(&self) {
        self.gate.send_replace(true);
    }

    /// `insert_many` for this collection fails before returning a write.
    pub fn refuse_issue(&self, collection: &str) {
        self.behaviour
            .lock()
            .unwrap()
            .refuse_issue
            .insert(collection.to_string());
    }

    /// Writes to this collection are issued but reject.
    pub fn reject_write(&self, collection: &str) {
        self.behaviour
            .lock()
            .unwrap()
            .reject_write
            .insert(collection.to_string());
    }

    /// Writes to this collection never settle.
    pub fn hang_write(&self, collection: &str) {
        self.behaviour
            .lock()
            .unwrap()
            .hang_write
            .insert(collection.to_string());
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Documents received for `collection` across all calls, in order.
    pub fn documents_for(&self, collection: &str) -> Vec<u32> {
        self.calls()
            .into_iter()
            .filter(|c| c.collection == collection)
            .flat_map(|c| c.documents)
            .collect()
    }

    /// Completion instants of writes that have settled so far.
    pub fn settled_at(&self) -> Vec<Instant> {
        self.settled_at.lock().unwrap().clone()
    }
}

impl BulkStore for RecordingStore {
    type Document = u32;

    fn insert_many(
        &self,
        collection: &str,
        documents: Vec<u32>,
    ) -> Result<InsertFuture, StoreError> {
        let behaviour = self.behaviour.lock().unwrap();
        if behaviour.refuse_issue.contains(collection) {
            return Err(StoreError::UnknownCollection(collection.to_string()));
        }
        let reject = behaviour.reject_write.contains(collection);
        let hang = behaviour.hang_write.contains(collection);
        drop(behaviour);

        let count = documents.len() as u64;
        self.calls.lock().unwrap().push(RecordedCall {
            collection: collection.to_string(),
            documents,
            issued_at: Instant::now(),
        });

        let mut gate = self.gate.subscribe();
        let settled_at = Arc::clone(&self.settled_at);
        let collection = collection.to_string();
        Ok(Box::pin(async move {
            if hang {
                futures::future::pending::<()>().await;
            }
            let _ = gate.wait_for(|open| *open).await;
            settled_at.lock().unwrap().push(Instant::now());
            if reject {
                log::debug!("Rejecting write to {}", collection);
                Err(StoreError::Sql(sqlx::Error::PoolTimedOut))
            } else {
                Ok(count)
            }
        }))
    }
}
