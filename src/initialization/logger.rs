//! Logger initialization.

use std::io::{self, Write};

use crate::config::LogFormat;
use crate::error_handling::InitializationError;
use chrono::{Local, SecondsFormat, Utc};
use colored::{ColoredString, Colorize};
use env_logger::fmt::Formatter;
use log::{Level, LevelFilter, Record};

/// Initializes the logger with the specified level and format.
///
/// Plain output is one colored line per record; JSON output is one object per
/// line with `ts`, `level`, `target` and `msg` fields.
///
/// `level` sets the default for every target. Per-module directives in
/// `RUST_LOG` still apply on top of it, e.g.
/// `RUST_LOG=doc_batcher::batcher=trace,sqlx=info`. Without such a directive
/// `sqlx` is capped at `warn`, since it logs every statement at `info`.
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if a logger is already installed.
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    colored::control::set_override(true);

    let rust_log = std::env::var("RUST_LOG").ok();
    let logger = build_logger(level, format, rust_log.as_deref());

    let max_level = logger.filter();
    log::set_boxed_logger(Box::new(logger))?;
    log::set_max_level(max_level);
    Ok(())
}

fn build_logger(level: LevelFilter, format: LogFormat, rust_log: Option<&str>) -> env_logger::Logger {
    let mut builder = env_logger::Builder::new();

    // Later directives for the same module replace earlier ones
    builder.filter_module("sqlx", LevelFilter::Warn);
    if let Some(directives) = rust_log {
        builder.parse_filters(directives);
    }
    builder.filter_level(level);

    match format {
        LogFormat::Json => builder.format(write_json),
        LogFormat::Plain => builder.format(write_plain),
    };
    builder.build()
}

fn write_json(buf: &mut Formatter, record: &Record) -> io::Result<()> {
    let line = serde_json::json!({
        "ts": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        "level": record.level().as_str(),
        "target": record.target(),
        "msg": record.args().to_string(),
    });
    writeln!(buf, "{}", line)
}

fn write_plain(buf: &mut Formatter, record: &Record) -> io::Result<()> {
    writeln!(
        buf,
        "{} {:<5} {}: {}",
        Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string().dimmed(),
        paint(record.level()),
        record.target().cyan(),
        record.args()
    )
}

fn paint(level: Level) -> ColoredString {
    let label = level.as_str();
    match level {
        Level::Error => label.red().bold(),
        Level::Warn => label.yellow(),
        Level::Info => label.green(),
        Level::Debug => label.blue(),
        Level::Trace => label.purple(),
    }
}
