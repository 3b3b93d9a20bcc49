//! Configuration constants.
//!
//! This module defines the defaults used by the batcher, the SQLite store and
//! the ingest pipeline.

use std::time::Duration;

/// Default admission limit for a batcher.
///
/// Admission is refused once `admitted + 1 >= limit`, so at most
/// `limit - 1` documents are admitted between two flushes.
pub const DEFAULT_BATCH_LIMIT: usize = 1000;

/// Upper bound on how long a single bulk write may take before it is
/// recorded as timed out and the flush lock is released.
pub const DEFAULT_SETTLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Default interval for the periodic flush driver, in milliseconds.
/// Zero disables the driver.
pub const DEFAULT_FLUSH_INTERVAL_MS: u64 = 5_000;

/// Default SQLite database path.
pub const DB_PATH: &str = "./doc_batcher.db";

/// Maximum time to wait for a pooled SQLite connection.
pub const DB_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Maximum number of pooled SQLite connections.
pub const DB_MAX_CONNECTIONS: u32 = 8;

/// Log a progress line every this many ingested lines.
pub const LOGGING_INTERVAL: usize = 10_000;
