//! File system paths for a full-sync run.

use crate::{CoreError, CoreResult};
use std::path::PathBuf;

/// Manages file system paths for full-sync.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Base directory for runtime files (~/.full-sync)
    base_dir: PathBuf,
}

impl Paths {
    /// Create a new Paths instance rooted at `~/.full-sync`.
    pub fn new() -> CoreResult<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| CoreError::Path("Could not determine home directory".to_string()))?;

        Ok(Self {
            base_dir: home.join(".full-sync"),
        })
    }

    /// Create a new Paths instance with a custom base directory.
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory (~/.full-sync).
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the config file path (~/.full-sync/config.json).
    pub fn config_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the logs directory (~/.full-sync/logs).
    pub fn logs_dir(&self) -> PathBuf {
        self.base_dir.join("logs")
    }

    /// Get the structured log file path (~/.full-sync/logs/full-sync.jsonl).
    pub fn log_file(&self) -> PathBuf {
        self.logs_dir().join("full-sync.jsonl")
    }

    /// Ensure all required directories exist.
    pub fn ensure_dirs(&self) -> CoreResult<()> {
        std::fs::create_dir_all(&self.base_dir)?;
        std::fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }
}
