//! The document syncer event loop.

use crate::{
    BatchAccumulator, BatchLimits, DocumentInput, FlushTrigger, SinkAdapter, SyncerError,
    SyncerIdentity, SyncerResult,
};
use sync_config_and_utils::Config;
use target_writer::{new_writer, BulkWriter, Namespace};
use tokio::sync::mpsc;
use tokio::time::{sleep, Instant};
use tracing::{debug, error, info, trace};

/// Totals of what a syncer wrote before it stopped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub batches: usize,
    pub records: usize,
    pub bytes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopState {
    Running,
    /// Input channel closed: flush what is left, then exit.
    Draining,
}

/// Drains one input channel into bulk writes against one namespace.
///
/// A batch goes out as soon as it holds `max_count` documents, reaches
/// `max_bytes`, or `flush_interval` has passed since the previous flush,
/// whichever comes first. Closing the input channel flushes the remainder
/// and ends the syncer.
///
/// # Lifecycle
///
/// 1. Create with [`DocumentSyncer::create()`] (or [`DocumentSyncer::with_writer()`])
/// 2. Feed `DocumentInput` values through the channel
/// 3. Drop every sender; [`DocumentSyncer::run()`] returns once the rest is written
pub struct DocumentSyncer {
    identity: SyncerIdentity,
    limits: BatchLimits,
    input: mpsc::Receiver<DocumentInput>,
    sink: SinkAdapter,
}

impl DocumentSyncer {
    /// Creates the syncer for `table` and builds its writer from `config`.
    ///
    /// The namespace is `<config.source_id>.<table>`. Failing to build the
    /// writer is fatal for this syncer.
    pub async fn create(
        table_syncer_id: usize,
        table: &str,
        id: usize,
        input: mpsc::Receiver<DocumentInput>,
        config: &Config,
    ) -> SyncerResult<Self> {
        let ns = Namespace::new(config.source_id.clone(), table);
        let identity = SyncerIdentity::new(table_syncer_id, id, ns.clone());

        let writer = new_writer(
            &config.target_type,
            &config.target_address,
            ns,
            &config.log_level,
        )
        .await
        .map_err(|source| {
            error!(syncer = %identity, error = %source, "create writer failed");
            SyncerError::CreateWriter {
                identity: identity.clone(),
                source,
            }
        })?;

        Ok(Self::with_writer(identity, input, writer))
    }

    /// Creates a syncer around an already-built writer.
    pub fn with_writer(
        identity: SyncerIdentity,
        input: mpsc::Receiver<DocumentInput>,
        writer: Box<dyn BulkWriter>,
    ) -> Self {
        Self {
            identity,
            limits: BatchLimits::default(),
            input,
            sink: SinkAdapter::new(writer),
        }
    }

    /// Replaces the default batch limits.
    pub fn with_limits(mut self, limits: BatchLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn identity(&self) -> &SyncerIdentity {
        &self.identity
    }

    /// Runs the loop until the input channel is closed and drained.
    ///
    /// The writer is closed exactly once when the loop ends, whether it ended
    /// by draining or by a failed bulk write. A failed write is returned
    /// immediately; nothing after it is read or written.
    pub async fn run(self) -> SyncerResult<SyncSummary> {
        let Self {
            identity,
            limits,
            mut input,
            mut sink,
        } = self;

        let result = event_loop(&identity, limits, &mut input, &mut sink).await;
        sink.close().await;

        if let Ok(summary) = &result {
            info!(
                syncer = %identity,
                batches = summary.batches,
                records = summary.records,
                bytes = summary.bytes,
                "finish writing"
            );
        }
        result
    }
}

async fn event_loop(
    identity: &SyncerIdentity,
    limits: BatchLimits,
    input: &mut mpsc::Receiver<DocumentInput>,
    sink: &mut SinkAdapter,
) -> SyncerResult<SyncSummary> {
    let trigger = FlushTrigger::new(&limits);
    let mut accumulator = BatchAccumulator::with_capacity(limits.max_count);
    let mut summary = SyncSummary::default();
    let mut state = LoopState::Running;

    let deadline = sleep(limits.flush_interval);
    tokio::pin!(deadline);

    loop {
        let mut timed_out = false;

        tokio::select! {
            maybe_input = input.recv() => match maybe_input {
                Some(DocumentInput::RawData(raw)) => {
                    if !accumulator.append(raw) {
                        trace!(syncer = %identity, "skipped zero-size record");
                    }
                }
                Some(DocumentInput::Unrecognized) => {
                    trace!(syncer = %identity, "ignored unrecognized input");
                }
                None => {
                    state = LoopState::Draining;
                    info!(syncer = %identity, "channel already closed, flushing cache and exiting");
                }
            },
            () = &mut deadline => {
                timed_out = true;
            }
        }

        let shutting_down = state == LoopState::Draining;
        debug!(
            syncer = %identity,
            shutting_down,
            timed_out,
            pending = accumulator.len(),
            pending_bytes = accumulator.byte_size(),
            "loop iteration"
        );

        if let Some(reason) =
            trigger.evaluate(shutting_down, timed_out, accumulator.len(), accumulator.byte_size())
        {
            if !accumulator.is_empty() {
                let batch = accumulator.take();
                let (records, bytes) = (batch.len(), batch.bytes);
                debug!(syncer = %identity, records, bytes, %reason, "writing data");

                if let Err(source) = sink.flush(batch.documents).await {
                    error!(
                        syncer = %identity,
                        records,
                        bytes,
                        error = %source,
                        "write data failed"
                    );
                    return Err(SyncerError::Write {
                        identity: identity.clone(),
                        records,
                        bytes,
                        source,
                    });
                }

                summary.batches += 1;
                summary.records += records;
                summary.bytes += bytes;
            }
            deadline
                .as_mut()
                .reset(Instant::now() + limits.flush_interval);
        }

        if state == LoopState::Draining && accumulator.is_empty() {
            return Ok(summary);
        }
    }
}
