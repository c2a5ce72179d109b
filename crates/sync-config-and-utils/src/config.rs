//! Configuration management for a full-sync run.

use crate::{CoreError, CoreResult, Paths};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default writer type tag.
pub const DEFAULT_TARGET_TYPE: &str = "file";

/// Default number of document syncers per table.
pub const DEFAULT_DOCUMENT_SYNCER_COUNT: usize = 4;

/// Default capacity of each document syncer's input channel.
pub const DEFAULT_INPUT_QUEUE_CAPACITY: usize = 1024;

/// Environment variable that overrides `log_level`.
const LOG_LEVEL_ENV: &str = "FULL_SYNC_LOG_LEVEL";

/// Main full-sync configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Source identifier. Used as the target database name of every namespace.
    pub source_id: String,
    /// Writer type tag (`http` or `file`).
    #[serde(default = "default_target_type")]
    pub target_type: String,
    /// Target address: a base URL for `http`, a directory for `file`.
    pub target_address: String,
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Number of parallel document syncers per table.
    #[serde(default = "default_document_syncer_count")]
    pub document_syncer_count: usize,
    /// Bounded capacity of each document syncer's input channel.
    #[serde(default = "default_input_queue_capacity")]
    pub input_queue_capacity: usize,
}

fn default_target_type() -> String {
    DEFAULT_TARGET_TYPE.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_document_syncer_count() -> usize {
    DEFAULT_DOCUMENT_SYNCER_COUNT
}

fn default_input_queue_capacity() -> usize {
    DEFAULT_INPUT_QUEUE_CAPACITY
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_id: "full-sync".to_string(),
            target_type: DEFAULT_TARGET_TYPE.to_string(),
            target_address: "./full-sync-output".to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            document_syncer_count: DEFAULT_DOCUMENT_SYNCER_COUNT,
            input_queue_capacity: DEFAULT_INPUT_QUEUE_CAPACITY,
        }
    }
}

impl Config {
    /// Load configuration from the default file location, falling back to defaults.
    ///
    /// Environment variables are applied last.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };

        config.load_from_env();
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save(&self, paths: &Paths) -> CoreResult<()> {
        paths.ensure_dirs()?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(paths.config_file(), content)?;
        Ok(())
    }

    /// Override configuration from environment variables.
    /// Only log_level can be overridden at runtime.
    pub fn load_from_env(&mut self) {
        if let Ok(log_level) = std::env::var(LOG_LEVEL_ENV) {
            self.log_level = log_level;
        }
    }

    /// Reject settings no run could start with.
    pub fn validate(&self) -> CoreResult<()> {
        if self.source_id.trim().is_empty() {
            return Err(CoreError::Config("source_id must not be empty".to_string()));
        }
        if self.document_syncer_count == 0 {
            return Err(CoreError::Config(
                "document_syncer_count must be greater than zero".to_string(),
            ));
        }
        if self.input_queue_capacity == 0 {
            return Err(CoreError::Config(
                "input_queue_capacity must be greater than zero".to_string(),
            ));
        }
        if self.target_type.eq_ignore_ascii_case("http") {
            self.target_url()?;
        }
        Ok(())
    }

    /// Get the target address as a parsed URL.
    pub fn target_url(&self) -> CoreResult<Url> {
        Url::parse(&self.target_address).map_err(CoreError::from)
    }
}
