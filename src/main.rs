//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `doc_batcher` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use doc_batcher::initialization::init_logger_with;
use doc_batcher::{run_ingest, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    match run_ingest(config).await {
        Ok(report) => {
            println!(
                "Queued {} document{} from {} lines ({} written, {} lost, {} malformed) in {} flush{} over {:.1}s",
                report.documents_queued,
                if report.documents_queued == 1 { "" } else { "s" },
                report.lines_read,
                report.documents_written,
                report.documents_lost,
                report.malformed_lines,
                report.flushes,
                if report.flushes == 1 { "" } else { "es" },
                report.elapsed_seconds
            );
            println!("Results saved in {}", report.db_path.display());
            if report.documents_lost > 0 {
                process::exit(2);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("doc_batcher error: {:#}", e);
            process::exit(1);
        }
    }
}
