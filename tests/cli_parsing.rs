//! Tests for CLI argument parsing.

use clap::Parser;
use doc_batcher::{Config, LogFormat, LogLevel};
use std::path::PathBuf;

#[test]
fn test_full_argument_set() {
    let config = Config::try_parse_from([
        "doc_batcher",
        "records.jsonl",
        "--db-path",
        "/tmp/out.db",
        "--limit",
        "50",
        "--flush-interval-ms",
        "250",
        "--settle-timeout-secs",
        "5",
        "--collection",
        "users",
        "--strict-collections",
        "--log-level",
        "debug",
        "--log-format",
        "json",
    ])
    .expect("full argument set should parse");

    assert_eq!(config.file, PathBuf::from("records.jsonl"));
    assert_eq!(config.db_path, PathBuf::from("/tmp/out.db"));
    assert_eq!(config.limit, 50);
    assert_eq!(config.flush_interval_ms, 250);
    assert_eq!(config.settle_timeout_secs, 5);
    assert_eq!(config.collections, vec!["users".to_string()]);
    assert!(config.strict_collections);
    assert!(matches!(config.log_level, LogLevel::Debug));
    assert!(matches!(config.log_format, LogFormat::Json));

    let batcher = config.batcher_config();
    assert_eq!(batcher.limit, 50);
    assert_eq!(batcher.settle_timeout, Some(std::time::Duration::from_secs(5)));
}

#[test]
fn test_missing_file_is_rejected() {
    assert!(Config::try_parse_from(["doc_batcher"]).is_err());
}

#[test]
fn test_invalid_values_are_rejected() {
    assert!(Config::try_parse_from(["doc_batcher", "in.jsonl", "--limit", "many"]).is_err());
    assert!(Config::try_parse_from(["doc_batcher", "in.jsonl", "--log-level", "loud"]).is_err());
    assert!(Config::try_parse_from(["doc_batcher", "in.jsonl", "--log-format", "xml"]).is_err());
}

#[test]
fn test_stdin_dash_is_accepted() {
    let config = Config::try_parse_from(["doc_batcher", "-"]).expect("dash should parse");
    assert_eq!(config.file, PathBuf::from("-"));
}
