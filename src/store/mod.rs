//! Bulk-write storage layer.
//!
//! This module provides:
//! - The [`BulkStore`] trait the batcher writes through
//! - SQLite connection pool management
//! - [`SqliteStore`], a document store keeping one table per collection

mod pool;
mod sqlite;

use futures::future::BoxFuture;

use crate::error_handling::StoreError;

// Re-export public API
pub use pool::init_db_pool_with_path;
pub use sqlite::SqliteStore;

/// An issued bulk write.
///
/// Resolves to the number of inserted documents once the write has settled.
pub type InsertFuture = BoxFuture<'static, Result<u64, StoreError>>;

/// A store that can persist many documents of one collection in a single call.
///
/// Issuing a write is split in two phases:
/// - `insert_many` itself runs synchronously and may fail right away, for
///   example when the collection is unknown to the store.
/// - The returned [`InsertFuture`] performs the write. It must not borrow from
///   the store, so it can be awaited after the caller has moved on.
pub trait BulkStore: Send + Sync + 'static {
    /// The record type persisted by this store.
    type Document: Send + 'static;

    /// Issues one bulk insert of `documents` into `collection`, preserving order.
    fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Self::Document>,
    ) -> Result<InsertFuture, StoreError>;
}

impl<S: BulkStore> BulkStore for std::sync::Arc<S> {
    type Document = S::Document;

    fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Self::Document>,
    ) -> Result<InsertFuture, StoreError> {
        (**self).insert_many(collection, documents)
    }
}
