//! Dev-mode logging: structured JSONL appended to one central file.
//!
//! Several syncer processes may share the file; every line is flushed on
//! write so lines from different processes never interleave.

use crate::json_layer::JsonLayer;
use crate::LogConfig;
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Central log file location.
/// Uses `~/.full-sync/logs/full-sync.jsonl` by default, or the working
/// directory when no home directory can be resolved.
fn default_log_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".full-sync")
        .join("logs")
        .join("full-sync.jsonl")
}

/// Append-only handle on the central JSONL file, shared by every layer.
#[derive(Clone)]
pub struct CentralLogWriter {
    inner: Arc<Mutex<BufWriter<File>>>,
}

impl CentralLogWriter {
    pub fn new(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            inner: Arc::new(Mutex::new(BufWriter::with_capacity(8192, file))),
        })
    }
}

impl Write for CentralLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self.inner.lock();
        let written = guard.write(buf)?;
        // One event per line; make it visible before the next one lands.
        guard.flush()?;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.lock().flush()
    }
}

impl<'a> MakeWriter<'a> for CentralLogWriter {
    type Writer = CentralLogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Initialize the dev subscriber with central JSONL file output.
pub fn init_dev_subscriber(config: &LogConfig) {
    let log_path = config.log_path.clone().unwrap_or_else(default_log_path);

    let writer = CentralLogWriter::new(&log_path)
        .unwrap_or_else(|e| panic!("failed to open log file {:?}: {}", log_path, e));

    let json_layer = JsonLayer::new(config.service_name.clone(), writer);

    let stderr_layer = if config.also_stderr {
        Some(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_file(false)
                .with_line_number(false)
                .compact()
                .with_writer(io::stderr)
                .with_ansi(true),
        )
    } else {
        None
    };

    let level = config.default_level.clone();
    let env_filter = move || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level))
    };

    tracing_subscriber::registry()
        .with(json_layer.with_filter(env_filter()))
        .with(stderr_layer.map(|l| l.with_filter(env_filter())))
        .init();

    tracing::info!(
        log_path = %log_path.display(),
        "observability initialized"
    );
}
