//! doc_batcher library: batched bulk inserts into a document store
//!
//! This library queues documents per destination collection and writes them
//! through one bulk insert per collection, so per-record write overhead is
//! paid once per batch.
//!
//! # Example
//!
//! ```no_run
//! use doc_batcher::{DocumentBatcher, SqliteStore, BatcherConfig};
//! use doc_batcher::initialization::init_db_pool_with_path;
//! use serde_json::json;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = init_db_pool_with_path(std::path::Path::new("docs.db")).await?;
//! let store = SqliteStore::new(pool);
//! store.register_collection("users").await?;
//!
//! let batcher = DocumentBatcher::with_config(store, BatcherConfig::with_limit(500));
//! if batcher.admit() {
//!     batcher.enqueue("users", json!({"name": "ada"}));
//! }
//!
//! let report = batcher.flush_and_wait().await?;
//! println!("Inserted {} documents", report.inserted());
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! `flush` spawns a background task and must run inside a Tokio runtime.

#![warn(missing_docs)]

mod batcher;
pub mod config;
mod driver;
mod error_handling;
pub mod initialization;
mod run;
pub mod store;

// Re-export public API
pub use batcher::{CollectionOutcome, DocumentBatcher, FlushHandle, FlushReport, WriteStatus};
pub use config::{BatcherConfig, Config, LogFormat, LogLevel};
pub use driver::start_flush_timer;
pub use error_handling::{BatchError, DatabaseError, InitializationError, StoreError};
pub use run::{run_ingest, IngestReport};
pub use store::{BulkStore, InsertFuture, SqliteStore};
