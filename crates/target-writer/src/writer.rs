//! Bulk writer trait and factory.

use crate::{HttpBulkWriter, JsonlFileWriter, Namespace, WriterError, WriterResult};
use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;
use tracing::info;

/// A single record payload handed to a writer.
pub type Document = serde_json::Value;

/// Bulk-write capability owned by exactly one document syncer.
///
/// Implementations own their connection handling and wire protocol. A
/// syncer calls `write_bulk` once per flushed batch, never concurrently,
/// and calls `close` exactly once after its loop has exited.
#[async_trait]
pub trait BulkWriter: Send {
    /// Write every document of one batch as a single bulk operation.
    async fn write_bulk(&mut self, documents: Vec<Document>) -> WriterResult<()>;

    /// Release the writer's resources.
    async fn close(&mut self);
}

/// Writer selected by a target type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterKind {
    /// JSON bulk requests against an HTTP endpoint.
    Http,
    /// Append-only JSONL files, one per namespace.
    File,
}

impl FromStr for WriterKind {
    type Err = WriterError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "file" => Ok(Self::File),
            _ => Err(WriterError::UnknownTarget(tag.to_string())),
        }
    }
}

impl fmt::Display for WriterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http => f.write_str("http"),
            Self::File => f.write_str("file"),
        }
    }
}

/// Build the writer for one syncer.
///
/// `log_level` is a verbosity hint: at `debug` or `trace` writers log
/// every bulk call they make.
pub async fn new_writer(
    target_type: &str,
    address: &str,
    ns: Namespace,
    log_level: &str,
) -> WriterResult<Box<dyn BulkWriter>> {
    let kind: WriterKind = target_type.parse()?;
    let verbose = is_verbose(log_level);

    let writer: Box<dyn BulkWriter> = match kind {
        WriterKind::Http => Box::new(HttpBulkWriter::new(address, ns.clone(), verbose)?),
        WriterKind::File => Box::new(JsonlFileWriter::open(address, ns.clone(), verbose).await?),
    };

    info!(target_type = %kind, address = %address, ns = %ns, "Created bulk writer");
    Ok(writer)
}

fn is_verbose(log_level: &str) -> bool {
    matches!(
        log_level.trim().to_ascii_lowercase().as_str(),
        "debug" | "trace"
    )
}
