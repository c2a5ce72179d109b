//! Document syncer error types.

use crate::SyncerIdentity;
use target_writer::WriterError;
use thiserror::Error;

/// Fatal document syncer failures. Either one ends the syncer.
#[derive(Error, Debug)]
pub enum SyncerError {
    /// The writer could not be built; the loop never started.
    #[error("{identity} create writer failed: {source}")]
    CreateWriter {
        identity: SyncerIdentity,
        source: WriterError,
    },

    /// A bulk write failed. `records` and `bytes` describe the lost batch so
    /// the affected source range can be replayed.
    #[error("{identity} write data failed ({records} records, {bytes} bytes): {source}")]
    Write {
        identity: SyncerIdentity,
        records: usize,
        bytes: usize,
        source: WriterError,
    },
}

/// Result type alias using SyncerError.
pub type SyncerResult<T> = Result<T, SyncerError>;
