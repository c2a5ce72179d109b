//! Logging initialization for full-sync.
//!
//! Thin wrapper over the observability crate: callers pick a level and
//! optionally a JSONL log file, then use `tracing` macros everywhere.

use observability::LogConfig;
use std::path::PathBuf;

/// Initialize the logging system.
///
/// # Arguments
///
/// * `level` - Default log level (trace, debug, info, warn, error)
/// * `log_path` - Optional JSONL log file, used when built with the `dev` feature
///
/// # Example
///
/// ```ignore
/// init_logging("info", None);
/// tracing::info!("full sync started");
/// ```
pub fn init_logging(level: &str, log_path: Option<PathBuf>) {
    observability::init_with_config(LogConfig {
        service_name: "full-sync".into(),
        default_level: parse_level(level).to_string().to_lowercase(),
        log_path,
        also_stderr: true,
    });
}

/// Parse a log level string into a tracing Level.
pub fn parse_level(level: &str) -> tracing::Level {
    match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" | "warning" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}
