//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::constants::{
    DB_PATH, DEFAULT_BATCH_LIMIT, DEFAULT_FLUSH_INTERVAL_MS, DEFAULT_SETTLE_TIMEOUT,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Settings for a [`DocumentBatcher`](crate::DocumentBatcher).
#[derive(Debug, Clone)]
pub struct BatcherConfig {
    /// Admission limit; at most `limit - 1` documents are admitted per batch
    pub limit: usize,
    /// Per-write bound after which a bulk write counts as settled (timed out).
    /// `None` waits forever.
    pub settle_timeout: Option<Duration>,
}

impl BatcherConfig {
    /// Config with the given limit and the default settle timeout.
    pub fn with_limit(limit: usize) -> Self {
        BatcherConfig {
            limit,
            ..Default::default()
        }
    }
}

impl Default for BatcherConfig {
    fn default() -> Self {
        BatcherConfig {
            limit: DEFAULT_BATCH_LIMIT,
            settle_timeout: Some(DEFAULT_SETTLE_TIMEOUT),
        }
    }
}

/// Ingest configuration, parsed from the command line by the binary.
///
/// Can also be constructed programmatically:
///
/// ```no_run
/// use doc_batcher::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     file: PathBuf::from("records.jsonl"),
///     limit: 500,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Parser)]
#[command(
    name = "doc_batcher",
    version,
    about = "Batch JSON Lines records into per-collection bulk inserts"
)]
pub struct Config {
    /// JSON Lines file to read records from (`-` for stdin)
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// SQLite database path
    #[arg(long, default_value = DB_PATH)]
    pub db_path: PathBuf,

    /// Admission limit per batch (at most limit - 1 records are queued between flushes)
    #[arg(long, default_value_t = DEFAULT_BATCH_LIMIT)]
    pub limit: usize,

    /// Periodic flush interval in milliseconds (0 disables the timer)
    #[arg(long, default_value_t = DEFAULT_FLUSH_INTERVAL_MS)]
    pub flush_interval_ms: u64,

    /// Seconds a bulk write may take before it counts as timed out (0 waits forever)
    #[arg(long, default_value_t = DEFAULT_SETTLE_TIMEOUT.as_secs())]
    pub settle_timeout_secs: u64,

    /// Collection to register up front (repeatable)
    #[arg(long = "collection", value_name = "NAME")]
    pub collections: Vec<String>,

    /// Only accept collections passed with --collection
    #[arg(long)]
    pub strict_collections: bool,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

impl Config {
    /// Batcher settings derived from the CLI flags.
    pub fn batcher_config(&self) -> BatcherConfig {
        BatcherConfig {
            limit: self.limit,
            settle_timeout: match self.settle_timeout_secs {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
        }
    }

    /// Flush timer period, if enabled.
    pub fn flush_interval(&self) -> Option<Duration> {
        match self.flush_interval_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            file: PathBuf::from("records.jsonl"),
            db_path: PathBuf::from(DB_PATH),
            limit: DEFAULT_BATCH_LIMIT,
            flush_interval_ms: DEFAULT_FLUSH_INTERVAL_MS,
            settle_timeout_secs: DEFAULT_SETTLE_TIMEOUT.as_secs(),
            collections: Vec::new(),
            strict_collections: false,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
        }
    }
}
