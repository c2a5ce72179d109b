//! Bulk-write capability used by document syncers.
//!
//! This crate provides:
//! - BulkWriter: the async trait a syncer flushes batches through
//! - new_writer: factory keyed by target type tag
//! - HttpBulkWriter / JsonlFileWriter: concrete targets
//! - RecordingWriter: in-memory writer for tests and dry runs

mod error;
mod file;
mod http;
mod namespace;
mod recording;
mod writer;

pub use error::{WriterError, WriterResult};
pub use file::JsonlFileWriter;
pub use http::HttpBulkWriter;
pub use namespace::Namespace;
pub use recording::RecordingWriter;
pub use writer::{new_writer, BulkWriter, Document, WriterKind};
