//! Sink adapter between a document syncer and its bulk writer.

use target_writer::{BulkWriter, Document, WriterResult};

/// Owns the syncer's writer for its whole lifetime.
///
/// `flush` borrows mutably, so one syncer can never have two bulk writes
/// outstanding. `close` consumes the adapter, so the writer is closed once.
pub struct SinkAdapter {
    writer: Box<dyn BulkWriter>,
}

impl SinkAdapter {
    pub fn new(writer: Box<dyn BulkWriter>) -> Self {
        Self { writer }
    }

    /// Write one batch as a single bulk operation.
    ///
    /// An empty batch succeeds without touching the writer. Writer errors
    /// are returned as-is.
    pub async fn flush(&mut self, documents: Vec<Document>) -> WriterResult<()> {
        if documents.is_empty() {
            return Ok(());
        }
        self.writer.write_bulk(documents).await
    }

    pub async fn close(mut self) {
        self.writer.close().await;
    }
}
