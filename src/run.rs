//! JSON Lines ingest pipeline.
//!
//! Reads records of the form `{"collection": "<name>", "document": <json>}`,
//! queues them in a [`DocumentBatcher`] backed by [`SqliteStore`] and flushes
//! whenever admission is refused, on a timer, and once more at end of input.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{ensure, Context, Result};
use log::{info, warn};
use serde::Deserialize;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio_util::sync::CancellationToken;

use crate::batcher::DocumentBatcher;
use crate::config::{Config, LOGGING_INTERVAL};
use crate::driver::start_flush_timer;
use crate::store::{init_db_pool_with_path, SqliteStore};

/// One input line.
#[derive(Debug, Deserialize)]
struct IngestRecord {
    collection: String,
    document: Value,
}

/// Results of an ingest run.
#[derive(Debug, Clone)]
pub struct IngestReport {
    /// Lines read from the input, including skipped ones
    pub lines_read: usize,
    /// Documents handed to the batcher
    pub documents_queued: usize,
    /// Lines that were not UTF-8, could not be parsed, or named an invalid collection
    pub malformed_lines: usize,
    /// Flushes triggered by refused admission or by the timer
    pub flushes: usize,
    /// Documents present in the store after the run that were not there before
    pub documents_written: u64,
    /// Queued documents that did not reach the store
    pub documents_lost: u64,
    /// Path to the SQLite database
    pub db_path: PathBuf,
    /// Elapsed time in seconds
    pub elapsed_seconds: f64,
}

/// Row counts per collection, taken when each collection was first seen.
struct CollectionBaseline {
    store: Arc<SqliteStore>,
    counts: HashMap<String, i64>,
}

impl CollectionBaseline {
    fn new(store: Arc<SqliteStore>) -> Self {
        CollectionBaseline {
            store,
            counts: HashMap::new(),
        }
    }

    async fn register(&mut self, collection: &str) -> Result<()> {
        if self.counts.contains_key(collection) {
            return Ok(());
        }
        self.store.register_collection(collection).await?;
        let existing = self.store.count(collection).await?;
        self.counts.insert(collection.to_string(), existing);
        Ok(())
    }

    async fn written_since(&self) -> Result<u64> {
        let mut written = 0u64;
        for (collection, before) in &self.counts {
            let now = self.store.count(collection).await?;
            written += u64::try_from(now - before).unwrap_or(0);
        }
        Ok(written)
    }
}

/// Runs an ingest with the provided configuration.
///
/// # Errors
///
/// Returns an error if the input cannot be opened or read, the database
/// cannot be initialized, or a `--collection` name is invalid. Undecodable or
/// malformed lines are skipped and counted. Store failures during flushes are
/// not errors; they show up as `documents_lost`.
///
/// # Example
///
/// ```no_run
/// use doc_batcher::{run_ingest, Config};
/// use std::path::PathBuf;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config {
///     file: PathBuf::from("records.jsonl"),
///     ..Default::default()
/// };
/// let report = run_ingest(config).await?;
/// println!("Wrote {} documents", report.documents_written);
/// # Ok(())
/// # }
/// ```
pub async fn run_ingest(config: Config) -> Result<IngestReport> {
    ensure!(
        config.limit >= 2,
        "--limit must be at least 2 (admission allows limit - 1 documents per batch)"
    );
    let start_time = Instant::now();

    let pool = init_db_pool_with_path(&config.db_path)
        .await
        .context("Failed to initialize database pool")?;
    let store = Arc::new(SqliteStore::new(pool));

    let mut baseline = CollectionBaseline::new(Arc::clone(&store));
    for name in &config.collections {
        baseline
            .register(name)
            .await
            .with_context(|| format!("Failed to register collection '{}'", name))?;
    }

    let batcher = Arc::new(DocumentBatcher::with_config(
        Arc::clone(&store),
        config.batcher_config(),
    ));

    let cancel = CancellationToken::new();
    // Stops the timer task on every early return; it flushes what is queued and exits
    let _stop_timer = cancel.clone().drop_guard();
    let timer = config.flush_interval().map(|period| {
        info!("Flushing every {:?}", period);
        start_flush_timer(Arc::clone(&batcher), period, cancel.clone())
    });

    let reader: Box<dyn AsyncRead + Unpin + Send> = if config.file.as_os_str() == "-" {
        info!("Reading records from stdin");
        Box::new(tokio::io::stdin())
    } else {
        Box::new(
            tokio::fs::File::open(&config.file)
                .await
                .with_context(|| format!("Failed to open input file {}", config.file.display()))?,
        )
    };
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    let mut lines_read = 0usize;
    let mut documents_queued = 0usize;
    let mut malformed_lines = 0usize;
    let mut flushes = 0usize;

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .await
            .context("Failed to read input")?;
        if read == 0 {
            break;
        }
        lines_read += 1;
        if lines_read % LOGGING_INTERVAL == 0 {
            info!(
                "Read {} lines, queued {} documents",
                lines_read, documents_queued
            );
        }

        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line.trim(),
            Err(e) => {
                warn!("Skipping line {}: not valid UTF-8 ({})", lines_read, e);
                malformed_lines += 1;
                continue;
            }
        };
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let record: IngestRecord = match serde_json::from_str(line) {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping malformed line {}: {}", lines_read, e);
                malformed_lines += 1;
                continue;
            }
        };

        if !config.strict_collections {
            if let Err(e) = baseline.register(&record.collection).await {
                warn!("Skipping line {}: {:#}", lines_read, e);
                malformed_lines += 1;
                continue;
            }
        }

        if !batcher.admit() {
            // Settlement is tracked by the batcher's flush lock
            drop(batcher.flush().await);
            flushes += 1;
            let admitted = batcher.admit();
            debug_assert!(admitted, "admission must succeed right after a flush");
        }
        batcher.enqueue(record.collection, record.document);
        documents_queued += 1;
    }

    match timer {
        Some(timer) => {
            cancel.cancel();
            flushes += timer
                .await
                .context("Flush timer task failed")?
                .context("Final flush failed")?;
        }
        None => {
            let report = batcher
                .flush_and_wait()
                .await
                .context("Final flush failed")?;
            if !report.is_clean() {
                warn!(
                    "Final flush lost {} of {} documents",
                    report.failed_documents(),
                    report.total_documents()
                );
            }
        }
    }

    let documents_written = baseline
        .written_since()
        .await
        .context("Failed to count stored documents")?;
    let documents_lost = (documents_queued as u64).saturating_sub(documents_written);

    Ok(IngestReport {
        lines_read,
        documents_queued,
        malformed_lines,
        flushes,
        documents_written,
        documents_lost,
        db_path: config.db_path,
        elapsed_seconds: start_time.elapsed().as_secs_f64(),
    })
}
