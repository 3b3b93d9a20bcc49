//! Error handling.
//!
//! This module provides the error enums for each concern:
//! - **Store errors**: failures issuing or executing a bulk write
//! - **Batch errors**: failures of the batcher's own background work
//! - **Database / initialization errors**: setup failures at startup
//!
//! Application-level code (`run_ingest`, the binary) wraps these in `anyhow`.

mod types;

// Re-export public API
pub use types::{BatchError, DatabaseError, InitializationError, StoreError};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_messages() {
        assert_eq!(
            StoreError::UnknownCollection("users".into()).to_string(),
            "Collection 'users' is not registered"
        );
        assert_eq!(
            StoreError::InvalidCollectionName("drop table".into()).to_string(),
            "Invalid collection name 'drop table'"
        );
    }

    #[test]
    fn test_store_error_from_serde() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let store_err: StoreError = err.into();
        assert!(matches!(store_err, StoreError::Serialization(_)));
        assert!(store_err
            .to_string()
            .starts_with("Document serialization error"));
    }

    #[test]
    fn test_database_error_from_sqlx() {
        let db_err: DatabaseError = sqlx::Error::RowNotFound.into();
        assert!(matches!(db_err, DatabaseError::SqlError(_)));
    }

    #[tokio::test]
    async fn test_batch_error_from_join_error() {
        let handle: tokio::task::JoinHandle<()> =
            tokio::spawn(async { panic!("settlement exploded") });
        let join_err = handle.await.unwrap_err();
        let batch_err: BatchError = join_err.into();
        assert!(batch_err
            .to_string()
            .starts_with("Flush settlement task failed"));
    }
}
