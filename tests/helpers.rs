// Shared test helpers for database setup and input file creation.
//
// This module provides common utilities used across multiple test files to reduce duplication.

use std::io::Write;
use std::path::{Path, PathBuf};

use doc_batcher::initialization::init_db_pool_with_path;
use doc_batcher::{Config, SqliteStore};
use tempfile::TempDir;

/// Creates a SQLite store backed by a database file inside `dir`.
#[allow(dead_code)] // Used by other test files
pub async fn create_test_store(dir: &Path) -> SqliteStore {
    let pool = init_db_pool_with_path(&dir.join("store.db"))
        .await
        .expect("Failed to create test database pool");
    SqliteStore::new(pool)
}

/// Writes `lines` to a JSON Lines file inside `dir` and returns its path.
#[allow(dead_code)] // Used by other test files
pub fn write_input(dir: &Path, lines: &[&str]) -> PathBuf {
    let path = dir.join("input.jsonl");
    let mut file = std::fs::File::create(&path).expect("Failed to create input file");
    for line in lines {
        writeln!(file, "{}", line).expect("Failed to write input line");
    }
    path
}

/// Ingest config pointing at a fresh database in `dir`, with the flush timer off.
#[allow(dead_code)] // Used by other test files
pub fn ingest_config(dir: &TempDir, input: PathBuf, limit: usize) -> Config {
    Config {
        file: input,
        db_path: dir.path().join("ingest.db"),
        limit,
        flush_interval_ms: 0,
        ..Default::default()
    }
}
