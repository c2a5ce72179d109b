//! JSONL file writer.

use crate::{BulkWriter, Document, Namespace, WriterError, WriterResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock, Weak};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::Mutex;
use tracing::{debug, warn};

type SharedFile = Arc<Mutex<BufWriter<File>>>;

/// Open namespace files, keyed by canonical path. Entries die with their
/// last writer.
fn open_files() -> &'static parking_lot::Mutex<HashMap<PathBuf, Weak<Mutex<BufWriter<File>>>>> {
    static OPEN_FILES: OnceLock<
        parking_lot::Mutex<HashMap<PathBuf, Weak<Mutex<BufWriter<File>>>>>,
    > = OnceLock::new();
    OPEN_FILES.get_or_init(Default::default)
}

/// Returns the handle every writer on `path` shares, opening the file if no
/// live writer holds it.
async fn shared_file(path: &Path) -> WriterResult<SharedFile> {
    let live = open_files().lock().get(path).and_then(Weak::upgrade);
    if let Some(handle) = live {
        return Ok(handle);
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;

    let mut files = open_files().lock();
    // Another writer may have opened the same path while we were waiting.
    if let Some(handle) = files.get(path).and_then(Weak::upgrade) {
        return Ok(handle);
    }
    files.retain(|_, handle| handle.strong_count() > 0);

    let handle = Arc::new(Mutex::new(BufWriter::new(file)));
    files.insert(path.to_path_buf(), Arc::downgrade(&handle));
    Ok(handle)
}

/// Appends every document as one JSON line to `<dir>/<database>.<collection>.jsonl`.
///
/// All writers of one namespace in this process share a single file handle
/// and append each batch while holding its lock, so batches from parallel
/// syncers never interleave. Each bulk call is flushed before it returns, so
/// a successful `write_bulk` means the batch reached the file.
pub struct JsonlFileWriter {
    path: PathBuf,
    ns: Namespace,
    out: SharedFile,
    verbose: bool,
}

impl JsonlFileWriter {
    /// Open (or create) the namespace file under `dir`.
    pub async fn open(dir: &str, ns: Namespace, verbose: bool) -> WriterResult<Self> {
        if dir.trim().is_empty() {
            return Err(WriterError::InvalidAddress {
                address: dir.to_string(),
                reason: "file target needs a directory".to_string(),
            });
        }

        tokio::fs::create_dir_all(dir).await?;
        let dir = tokio::fs::canonicalize(dir).await?;
        let path = dir.join(format!("{}.jsonl", ns));
        let out = shared_file(&path).await?;

        Ok(Self {
            path,
            ns,
            out,
            verbose,
        })
    }

    /// Path of the file this writer appends to.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl BulkWriter for JsonlFileWriter {
    async fn write_bulk(&mut self, documents: Vec<Document>) -> WriterResult<()> {
        let mut buf = Vec::with_capacity(documents.len() * 64);
        for document in &documents {
            serde_json::to_writer(&mut buf, document)?;
            buf.push(b'\n');
        }

        {
            let mut out = self.out.lock().await;
            out.write_all(&buf).await?;
            out.flush().await?;
        }

        if self.verbose {
            debug!(
                ns = %self.ns,
                path = %self.path.display(),
                documents = documents.len(),
                bytes = buf.len(),
                "Appended bulk write"
            );
        }
        Ok(())
    }

    /// Flushes the shared handle. The file itself is closed when the last
    /// writer on it is dropped.
    async fn close(&mut self) {
        if let Err(err) = self.out.lock().await.flush().await {
            warn!(
                ns = %self.ns,
                path = %self.path.display(),
                error = %err,
                "Closing JSONL writer failed"
            );
        }
    }
}
