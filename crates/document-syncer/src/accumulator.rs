//! Pending records of one document syncer.

use crate::RawData;
use target_writer::Document;

/// A batch handed to the sink: documents in arrival order plus their total size.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    pub documents: Vec<Document>,
    pub bytes: usize,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// In-memory holding area for records awaiting the next flush.
#[derive(Debug)]
pub struct BatchAccumulator {
    documents: Vec<Document>,
    bytes: usize,
    capacity: usize,
}

impl BatchAccumulator {
    /// `capacity` is a preallocation hint, normally the batch count limit.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            documents: Vec::with_capacity(capacity),
            bytes: 0,
            capacity,
        }
    }

    /// Add one record. Zero-size records are skipped and `false` is returned.
    pub fn append(&mut self, raw: RawData) -> bool {
        if raw.size == 0 {
            return false;
        }
        self.documents.push(raw.data);
        self.bytes = self.bytes.saturating_add(raw.size);
        true
    }

    /// Hand over everything pending and start a fresh batch.
    pub fn take(&mut self) -> Batch {
        let batch = Batch {
            documents: std::mem::take(&mut self.documents),
            bytes: self.bytes,
        };
        self.reset();
        batch
    }

    /// Drop everything pending.
    pub fn reset(&mut self) {
        self.documents = Vec::with_capacity(self.capacity);
        self.bytes = 0;
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn byte_size(&self) -> usize {
        self.bytes
    }
}
