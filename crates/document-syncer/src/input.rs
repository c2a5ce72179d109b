//! Values read off a document syncer's input channel.

use target_writer::Document;

/// One parsed source record and its serialized size in bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct RawData {
    pub data: Document,
    pub size: usize,
}

impl RawData {
    pub fn new(data: Document, size: usize) -> Self {
        Self { data, size }
    }
}

/// Everything the upstream parser can hand a document syncer.
///
/// Only `RawData` carries a record. Anything else is dropped by the syncer
/// without error.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentInput {
    RawData(RawData),
    /// A source item the parser could not turn into a document.
    Unrecognized,
}

impl From<RawData> for DocumentInput {
    fn from(raw: RawData) -> Self {
        Self::RawData(raw)
    }
}
