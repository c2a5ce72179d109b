//! # Observability
//!
//! Centralized logging layer for the full-sync workspace.
//!
//! Binaries call `observability::init()` once at startup and use standard
//! `tracing` macros throughout. Library crates (the document syncer, the
//! writers) only emit events and never install a subscriber.
//!
//! ## Dev Mode
//!
//! With the `dev` feature, all events are written as structured JSONL to a
//! central file (`~/.full-sync/logs/full-sync.jsonl` unless overridden), so a
//! migration run can be followed with `tail -f ... | jq`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! fn main() {
//!     observability::init("full-sync");
//!     tracing::info!("service started");
//! }
//! ```

#[cfg(feature = "dev")]
mod dev;

#[cfg_attr(not(feature = "dev"), allow(dead_code))]
mod json_layer;

use std::path::PathBuf;

/// Configuration for the logging system.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Name of the service (e.g., "full-sync").
    /// Included in every JSONL line for filtering.
    pub service_name: String,

    /// Default log level filter (e.g., "debug", "info", "warn").
    /// Can be overridden by `RUST_LOG` environment variable.
    pub default_level: String,

    /// Optional custom log file path (dev mode only).
    pub log_path: Option<PathBuf>,

    /// Also emit logs to stderr in dev mode.
    pub also_stderr: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "unknown".into(),
            default_level: "info".into(),
            log_path: None,
            also_stderr: false,
        }
    }
}

/// Initialize the logging layer with default settings.
///
/// # Panics
///
/// In dev mode, panics if the log file cannot be created or opened.
pub fn init(service_name: &str) {
    init_with_config(LogConfig {
        service_name: service_name.into(),
        ..Default::default()
    });
}

/// Initialize the logging layer with custom configuration.
///
/// ```rust,ignore
/// observability::init_with_config(observability::LogConfig {
///     service_name: "full-sync".into(),
///     default_level: "debug".into(),
///     also_stderr: true,
///     ..Default::default()
/// });
/// ```
pub fn init_with_config(config: LogConfig) {
    #[cfg(feature = "dev")]
    {
        dev::init_dev_subscriber(&config);
    }

    #[cfg(not(feature = "dev"))]
    {
        use tracing_subscriber::util::SubscriberInitExt;
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.default_level)),
            )
            .with_target(true)
            .with_writer(std::io::stderr)
            .compact()
            .finish()
            .init();
    }
}

/// Re-export tracing macros for convenience.
pub use tracing::{debug, error, info, instrument, trace, warn};

/// Re-export Level for advanced filtering.
pub use tracing::Level;
