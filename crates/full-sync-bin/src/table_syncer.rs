//! Table syncer: fans one table's records out to its document syncers.

use document_syncer::{
    DocumentInput, DocumentSyncer, RawData, SyncSummary, SyncerError, SyncerResult,
};
use sync_config_and_utils::Config;
use target_writer::Document;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info, warn};

/// Errors that end a table sync.
#[derive(Error, Debug)]
pub enum TableSyncError {
    #[error(transparent)]
    Syncer(#[from] SyncerError),

    #[error("Failed to read input: {0}")]
    Input(#[from] std::io::Error),

    #[error("Document syncer task failed: {0}")]
    Join(#[from] JoinError),
}

pub type TableSyncResult<T> = Result<T, TableSyncError>;

/// Counts of what was read off the input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedStats {
    /// Non-blank lines read.
    pub lines: usize,
    /// Lines that parsed as a JSON document.
    pub records: usize,
    /// Lines handed on as `DocumentInput::Unrecognized`.
    pub unrecognized: usize,
}

/// Outcome of a whole table sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableSummary {
    pub feed: FeedStats,
    pub written: SyncSummary,
}

/// Owns the document syncers of one table and the sending half of each of
/// their input channels.
pub struct TableSyncer {
    id: usize,
    table: String,
    senders: Vec<mpsc::Sender<DocumentInput>>,
    workers: Vec<JoinHandle<SyncerResult<SyncSummary>>>,
    next: usize,
}

impl TableSyncer {
    /// Create and spawn `config.document_syncer_count` syncers for `table`.
    pub async fn start(id: usize, table: &str, config: &Config) -> TableSyncResult<Self> {
        let count = config.document_syncer_count.max(1);
        let mut senders = Vec::with_capacity(count);
        let mut workers = Vec::with_capacity(count);

        for syncer_id in 0..count {
            let (tx, rx) = mpsc::channel(config.input_queue_capacity.max(1));
            let syncer = match DocumentSyncer::create(id, table, syncer_id, rx, config).await {
                Ok(syncer) => syncer,
                Err(err) => {
                    abandon(senders, workers).await;
                    return Err(err.into());
                }
            };
            debug!(table_syncer = id, syncer = %syncer.identity(), "document syncer started");
            senders.push(tx);
            workers.push(tokio::spawn(syncer.run()));
        }

        info!(
            table_syncer = id,
            table = %table,
            document_syncers = count,
            target_type = %config.target_type,
            "table syncer started"
        );

        Ok(Self {
            id,
            table: table.to_string(),
            senders,
            workers,
            next: 0,
        })
    }

    /// Read JSONL records from `reader` and hand them out round-robin.
    ///
    /// Blank lines are skipped. A line that is not valid JSON is passed on as
    /// `DocumentInput::Unrecognized`. Feeding stops early if a syncer has
    /// already exited, which only happens after a failed write.
    pub async fn feed<R>(&mut self, reader: R) -> TableSyncResult<FeedStats>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = reader.lines();
        let mut stats = FeedStats::default();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            stats.lines += 1;

            let input = match serde_json::from_str::<Document>(&line) {
                Ok(document) => {
                    stats.records += 1;
                    RawData::new(document, line.len()).into()
                }
                Err(err) => {
                    warn!(
                        table_syncer = self.id,
                        table = %self.table,
                        line = stats.lines,
                        error = %err,
                        "unrecognized input line"
                    );
                    stats.unrecognized += 1;
                    DocumentInput::Unrecognized
                }
            };

            if !self.dispatch(input).await {
                break;
            }
        }

        Ok(stats)
    }

    async fn dispatch(&mut self, input: DocumentInput) -> bool {
        let target = self.next;
        self.next = (self.next + 1) % self.senders.len();

        if self.senders[target].send(input).await.is_err() {
            warn!(
                table_syncer = self.id,
                document_syncer = target,
                "document syncer exited early, stop reading input"
            );
            return false;
        }
        true
    }

    /// Close every input channel and wait for all syncers to drain.
    ///
    /// Every syncer is awaited so each one closes its writer; the first
    /// failure in syncer order is returned.
    pub async fn finish(self) -> TableSyncResult<SyncSummary> {
        let Self {
            id,
            table,
            senders,
            workers,
            ..
        } = self;
        drop(senders);

        let mut total = SyncSummary::default();
        let mut first_error: Option<TableSyncError> = None;

        for worker in workers {
            match worker.await {
                Ok(Ok(summary)) => {
                    total.batches += summary.batches;
                    total.records += summary.records;
                    total.bytes += summary.bytes;
                }
                Ok(Err(err)) => {
                    first_error.get_or_insert(err.into());
                }
                Err(err) => {
                    first_error.get_or_insert(err.into());
                }
            }
        }

        if let Some(err) = first_error {
            return Err(err);
        }

        info!(
            table_syncer = id,
            table = %table,
            batches = total.batches,
            records = total.records,
            bytes = total.bytes,
            "table syncer finished"
        );
        Ok(total)
    }
}

/// Stop syncers that were already spawned when a later one failed to start.
///
/// Closing their channels lets each drain and close its writer; their results
/// are dropped in favour of the startup error.
async fn abandon(
    senders: Vec<mpsc::Sender<DocumentInput>>,
    workers: Vec<JoinHandle<SyncerResult<SyncSummary>>>,
) {
    drop(senders);
    for worker in workers {
        if let Err(err) = worker.await {
            warn!(error = %err, "document syncer task failed during startup abort");
        }
    }
}

/// Sync one table end to end: start its syncers, feed `reader`, drain.
pub async fn sync_table<R>(
    id: usize,
    table: &str,
    config: &Config,
    reader: R,
) -> TableSyncResult<TableSummary>
where
    R: AsyncBufRead + Unpin,
{
    let mut syncer = TableSyncer::start(id, table, config).await?;
    let fed = syncer.feed(reader).await;
    let written = syncer.finish().await?;

    Ok(TableSummary {
        feed: fed?,
        written,
    })
}
