//! SQLite-backed document store.
//!
//! Every collection maps to one table holding JSON documents. Collections must
//! be registered before they can be written to, so a typo in a collection name
//! fails when the bulk write is issued rather than creating a stray table.

use std::collections::HashSet;
use std::sync::{LazyLock, PoisonError, RwLock};

use regex::Regex;
use serde_json::Value;
use sqlx::SqlitePool;

use crate::error_handling::StoreError;

use super::{BulkStore, InsertFuture};

/// Collection names double as table names.
static COLLECTION_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid collection pattern"));

/// Document store keeping each collection in its own SQLite table.
pub struct SqliteStore {
    pool: SqlitePool,
    collections: RwLock<HashSet<String>>,
}

impl SqliteStore {
    /// Creates a store with no registered collections.
    pub fn new(pool: SqlitePool) -> Self {
        SqliteStore {
            pool,
            collections: RwLock::new(HashSet::new()),
        }
    }

    /// Registers a collection, creating its table if needed.
    ///
    /// Registering an already known collection is a no-op.
    pub async fn register_collection(&self, name: &str) -> Result<(), StoreError> {
        if !COLLECTION_NAME.is_match(name) {
            return Err(StoreError::InvalidCollectionName(name.to_string()));
        }
        if self.is_registered(name) {
            return Ok(());
        }

        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS \"{name}\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                document TEXT NOT NULL,
                inserted_at_ms INTEGER NOT NULL
            )"
        ))
        .execute(&self.pool)
        .await?;

        self.collections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string());
        log::debug!("Registered collection {}", name);
        Ok(())
    }

    /// Returns true if `name` was registered with this store.
    pub fn is_registered(&self, name: &str) -> bool {
        self.collections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(name)
    }

    /// Number of documents stored in a registered collection.
    pub async fn count(&self, collection: &str) -> Result<i64, StoreError> {
        self.ensure_registered(collection)?;
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM \"{collection}\""))
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// All documents of a registered collection, in insertion order.
    pub async fn fetch_all(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        self.ensure_registered(collection)?;
        let rows: Vec<String> =
            sqlx::query_scalar(&format!("SELECT document FROM \"{collection}\" ORDER BY id"))
                .fetch_all(&self.pool)
                .await?;
        rows.iter()
            .map(|raw| serde_json::from_str(raw).map_err(StoreError::from))
            .collect()
    }

    fn ensure_registered(&self, collection: &str) -> Result<(), StoreError> {
        if self.is_registered(collection) {
            Ok(())
        } else {
            Err(StoreError::UnknownCollection(collection.to_string()))
        }
    }
}

impl BulkStore for SqliteStore {
    type Document = Value;

    /// Writes all documents in one transaction; either every document of the
    /// call is committed or none is.
    fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Value>,
    ) -> Result<InsertFuture, StoreError> {
        self.ensure_registered(collection)?;

        let pool = self.pool.clone();
        let sql = format!("INSERT INTO \"{collection}\" (document, inserted_at_ms) VALUES (?, ?)");

        Ok(Box::pin(async move {
            let inserted_at = chrono::Utc::now().timestamp_millis();
            let mut tx = pool.begin().await?;
            for document in &documents {
                sqlx::query(&sql)
                    .bind(serde_json::to_string(document)?)
                    .bind(inserted_at)
                    .execute(&mut *tx)
                    .await?;
            }
            tx.commit().await?;
            Ok::<u64, StoreError>(documents.len() as u64)
        }))
    }
}
