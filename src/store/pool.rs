//! Database connection pool management.
//!
//! Every pooled connection is opened with WAL journaling and a busy timeout,
//! so concurrent bulk writes to different collections queue on the SQLite
//! write lock instead of failing with `SQLITE_BUSY`.

use std::path::Path;

use log::{debug, error, info};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::config::{DB_ACQUIRE_TIMEOUT, DB_MAX_CONNECTIONS};
use crate::error_handling::DatabaseError;

/// Opens (creating if needed) the SQLite database at `db_path`.
///
/// The parent directory must already exist. Connection acquisition fails after
/// [`DB_ACQUIRE_TIMEOUT`] instead of blocking bulk writes indefinitely.
pub async fn init_db_pool_with_path(db_path: &Path) -> Result<SqlitePool, DatabaseError> {
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.is_dir() {
            let message = format!("directory {} does not exist", parent.display());
            error!("Cannot create database {}: {}", db_path.display(), message);
            return Err(DatabaseError::FileCreationError(message));
        }
    }
    let existed = db_path.exists();

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(DB_ACQUIRE_TIMEOUT);

    let pool = SqlitePoolOptions::new()
        .max_connections(DB_MAX_CONNECTIONS)
        .acquire_timeout(DB_ACQUIRE_TIMEOUT)
        .connect_with(options)
        .await
        .map_err(|e| {
            error!("Failed to open database {}: {e}", db_path.display());
            DatabaseError::SqlError(e)
        })?;

    if existed {
        debug!("Reusing database {}", db_path.display());
    } else {
        info!("Created database {}", db_path.display());
    }
    Ok(pool)
}
