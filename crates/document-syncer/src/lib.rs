//! Document syncer: the batching engine of a full sync.
//!
//! A table syncer fans parsed source records out to several document
//! syncers. Each one owns a bounded input channel and a bulk writer for a
//! single namespace, and turns the stream of records into bulk writes.
//!
//! # Architecture
//!
//! ```text
//! mpsc::Receiver<DocumentInput>
//!        │
//!        ▼
//! ┌──────────────────┐   count / bytes / deadline   ┌─────────────┐
//! │ BatchAccumulator │ ───────── FlushTrigger ─────▶│ SinkAdapter │──▶ BulkWriter
//! └──────────────────┘                              └─────────────┘
//! ```
//!
//! A batch is flushed when it holds `max_count` documents, reaches
//! `max_bytes`, or `flush_interval` has elapsed since the previous flush.
//! Closing the channel flushes what is left and ends the syncer. A failed
//! bulk write ends it with [`SyncerError::Write`].

mod accumulator;
mod error;
mod identity;
mod input;
mod sink;
mod syncer;
mod trigger;

pub use accumulator::{Batch, BatchAccumulator};
pub use error::{SyncerError, SyncerResult};
pub use identity::SyncerIdentity;
pub use input::{DocumentInput, RawData};
pub use sink::SinkAdapter;
pub use syncer::{DocumentSyncer, SyncSummary};
pub use trigger::{
    BatchLimits, FlushReason, FlushTrigger, DEFAULT_FLUSH_INTERVAL, DEFAULT_MAX_BATCH_BYTES,
    DEFAULT_MAX_BATCH_COUNT,
};
