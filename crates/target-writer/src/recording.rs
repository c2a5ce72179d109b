//! In-memory recording writer.

use crate::{BulkWriter, Document, WriterError, WriterResult};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Default)]
struct RecordingState {
    batches: Vec<Vec<Document>>,
    written_at: Vec<Instant>,
    calls: usize,
    in_flight: usize,
    max_in_flight: usize,
    close_count: usize,
}

/// A writer that records every bulk call instead of sending it anywhere.
///
/// Clones share the same recording, so a test keeps one clone for
/// assertions and hands the other to a syncer.
#[derive(Debug, Clone, Default)]
pub struct RecordingWriter {
    state: Arc<Mutex<RecordingState>>,
    write_delay: Option<Duration>,
    fail_on_call: Option<usize>,
}

impl RecordingWriter {
    /// Creates a writer that accepts every batch immediately.
    pub fn new() -> Self {
        Self::default()
    }

    /// Each bulk call takes `delay` before completing.
    pub fn with_write_delay(mut self, delay: Duration) -> Self {
        self.write_delay = Some(delay);
        self
    }

    /// The `call`-th bulk call (1-based) fails with `WriterError::Injected`.
    pub fn failing_on_call(mut self, call: usize) -> Self {
        self.fail_on_call = Some(call);
        self
    }

    /// Every successfully written batch, in write order.
    pub fn batches(&self) -> Vec<Vec<Document>> {
        self.state.lock().expect("lock poisoned").batches.clone()
    }

    /// Completion time of every successfully written batch.
    pub fn written_at(&self) -> Vec<Instant> {
        self.state.lock().expect("lock poisoned").written_at.clone()
    }

    /// Number of `write_bulk` calls, failed ones included.
    pub fn call_count(&self) -> usize {
        self.state.lock().expect("lock poisoned").calls
    }

    /// Highest number of bulk calls that were outstanding at once.
    pub fn max_in_flight(&self) -> usize {
        self.state.lock().expect("lock poisoned").max_in_flight
    }

    /// Number of `close` calls.
    pub fn close_count(&self) -> usize {
        self.state.lock().expect("lock poisoned").close_count
    }
}

#[async_trait]
impl BulkWriter for RecordingWriter {
    async fn write_bulk(&mut self, documents: Vec<Document>) -> WriterResult<()> {
        let call = {
            let mut state = self.state.lock().expect("lock poisoned");
            state.calls += 1;
            state.in_flight += 1;
            state.max_in_flight = state.max_in_flight.max(state.in_flight);
            state.calls
        };

        if let Some(delay) = self.write_delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.lock().expect("lock poisoned");
        state.in_flight -= 1;
        if self.fail_on_call == Some(call) {
            return Err(WriterError::Injected(call));
        }
        state.batches.push(documents);
        state.written_at.push(Instant::now());
        Ok(())
    }

    async fn close(&mut self) {
        self.state.lock().expect("lock poisoned").close_count += 1;
    }
}
