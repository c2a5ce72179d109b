//! Writer error types.

use thiserror::Error;

/// Writer error type.
#[derive(Error, Debug)]
pub enum WriterError {
    /// Target type tag not recognized by the factory
    #[error("Unknown target type: {0}")]
    UnknownTarget(String),

    /// Target address cannot be used by the selected writer
    #[error("Invalid target address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },

    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Target answered but refused the bulk write
    #[error("Bulk write rejected: {0}")]
    Rejected(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failure injected by a RecordingWriter
    #[error("Injected failure on bulk write #{0}")]
    Injected(usize),
}

/// Result type alias using WriterError.
pub type WriterResult<T> = Result<T, WriterError>;
