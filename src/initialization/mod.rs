//! Application initialization.
//!
//! Sets up process-wide resources before the ingest pipeline starts:
//! - Logger
//! - Database connection pool (see [`crate::store::init_db_pool_with_path`])

mod logger;

// Re-export public API
pub use logger::init_logger_with;
pub use crate::store::init_db_pool_with_path;
