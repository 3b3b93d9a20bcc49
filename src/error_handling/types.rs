//! Error type definitions.
//!
//! This module defines the error types used by the store adapters, the batcher
//! and application setup.

use log::SetLoggerError;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),
}

/// Error types for database setup.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error creating the database file.
    #[error("Database file creation error: {0}")]
    FileCreationError(String),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),
}

/// Errors raised by a [`BulkStore`](crate::store::BulkStore).
///
/// The same type is used for failures while issuing a bulk write (returned
/// synchronously from `insert_many`) and for failures of the write itself.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No collection with this name was registered with the store.
    #[error("Collection '{0}' is not registered")]
    UnknownCollection(String),

    /// The collection name cannot be used as a table name.
    #[error("Invalid collection name '{0}'")]
    InvalidCollectionName(String),

    /// A document could not be serialized or deserialized.
    #[error("Document serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),
}

/// Errors surfaced by the batcher itself.
///
/// Store failures never reach callers of `flush`; they are reported in the
/// [`FlushReport`](crate::FlushReport) instead.
#[derive(Error, Debug)]
pub enum BatchError {
    /// The background task that awaited settlement did not finish normally.
    #[error("Flush settlement task failed: {0}")]
    SettlementTask(#[from] tokio::task::JoinError),
}
