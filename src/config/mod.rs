//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (limits, timeouts, paths)
//! - Batcher settings
//! - CLI option types and parsing

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{BatcherConfig, Config, LogFormat, LogLevel};
