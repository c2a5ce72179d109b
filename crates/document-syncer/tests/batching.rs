//! End-to-end batching behaviour of a document syncer against a recording writer.
//!
//! Every test runs on a paused clock so the flush deadline is deterministic.

use std::time::Duration;

use document_syncer::{BatchLimits, DocumentInput, DocumentSyncer, RawData, SyncerIdentity};
use serde_json::{json, Value};
use target_writer::{Namespace, RecordingWriter};
use tokio::sync::mpsc;
use tokio::time::{sleep, Instant};

fn identity() -> SyncerIdentity {
    SyncerIdentity::new(0, 0, Namespace::new("source", "orders"))
}

fn limits(max_count: usize, max_bytes: usize) -> BatchLimits {
    BatchLimits {
        max_count,
        max_bytes,
        flush_interval: Duration::from_secs(1),
    }
}

fn record(id: impl Into<Value>, size: usize) -> DocumentInput {
    RawData::new(json!({ "_id": id.into() }), size).into()
}

fn ids(batch: &[Value]) -> Vec<Value> {
    batch.iter().map(|doc| doc["_id"].clone()).collect()
}

/// Sends `inputs`, closes the channel, and runs the syncer to completion.
async fn run_prefilled(
    recorder: &RecordingWriter,
    limits: BatchLimits,
    inputs: Vec<DocumentInput>,
) -> document_syncer::SyncSummary {
    let (tx, rx) = mpsc::channel(inputs.len().max(1));
    for input in inputs {
        tx.send(input).await.unwrap();
    }
    drop(tx);

    DocumentSyncer::with_writer(identity(), rx, Box::new(recorder.clone()))
        .with_limits(limits)
        .run()
        .await
        .unwrap()
}

#[tokio::test(start_paused = true)]
async fn count_bound_splits_batches_in_arrival_order() {
    let recorder = RecordingWriter::new();
    let inputs = ["A", "B", "C", "D", "E"]
        .into_iter()
        .map(|id| record(id, 1))
        .collect();

    let summary = run_prefilled(&recorder, limits(3, 1_000_000), inputs).await;

    let batches: Vec<_> = recorder.batches().iter().map(|b| ids(b)).collect();
    assert_eq!(
        batches,
        vec![
            vec![json!("A"), json!("B"), json!("C")],
            vec![json!("D"), json!("E")],
        ]
    );
    assert_eq!(summary.batches, 2);
    assert_eq!(summary.records, 5);
    assert_eq!(recorder.close_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn size_bound_keeps_the_record_that_crossed_it() {
    let recorder = RecordingWriter::new();

    run_prefilled(
        &recorder,
        limits(10, 100),
        vec![record(1, 60), record(2, 60)],
    )
    .await;

    // 120 bytes went out together; the overshoot is not split off.
    let batches = recorder.batches();
    assert_eq!(batches.len(), 1);
    assert_eq!(ids(&batches[0]), vec![json!(1), json!(2)]);
}

#[tokio::test(start_paused = true)]
async fn size_bound_overshoots_by_one_record() {
    let recorder = RecordingWriter::new();
    let inputs = (0..5).map(|id| record(id, 30)).collect();

    let summary = run_prefilled(&recorder, limits(100, 100), inputs).await;

    let sizes: Vec<_> = recorder.batches().iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![4, 1]);
    assert_eq!(summary.bytes, 150);
}

#[tokio::test(start_paused = true)]
async fn default_limits_cap_batches_at_512_documents() {
    let recorder = RecordingWriter::new();
    let inputs = (0..1000).map(|id| record(id, 16)).collect();

    let summary = run_prefilled(&recorder, BatchLimits::default(), inputs).await;

    let batches = recorder.batches();
    let sizes: Vec<_> = batches.iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![512, 488]);

    let written: Vec<_> = batches.iter().flat_map(|b| ids(b)).collect();
    let expected: Vec<_> = (0..1000).map(|id| json!(id)).collect();
    assert_eq!(written, expected);
    assert_eq!(summary.records, 1000);
}

#[tokio::test(start_paused = true)]
async fn zero_size_records_are_never_written() {
    let recorder = RecordingWriter::new();

    let summary = run_prefilled(
        &recorder,
        limits(2, 1_000),
        vec![record(1, 0), record(2, 7), record(3, 0), record(4, 0)],
    )
    .await;

    let batches = recorder.batches();
    assert_eq!(batches.len(), 1);
    assert_eq!(ids(&batches[0]), vec![json!(2)]);
    assert_eq!(summary.bytes, 7);
}

#[tokio::test(start_paused = true)]
async fn lone_record_is_flushed_when_the_deadline_fires() {
    let recorder = RecordingWriter::new();
    let (tx, rx) = mpsc::channel(16);
    let start = Instant::now();
    let handle = tokio::spawn(
        DocumentSyncer::with_writer(identity(), rx, Box::new(recorder.clone())).run(),
    );

    tx.send(record("only", 5)).await.unwrap();
    sleep(Duration::from_millis(1_500)).await;

    assert_eq!(recorder.batches().len(), 1);
    assert_eq!(recorder.written_at()[0] - start, Duration::from_secs(1));

    drop(tx);
    let summary = handle.await.unwrap().unwrap();
    assert_eq!(summary.batches, 1);
    assert_eq!(recorder.close_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn trickle_of_records_does_not_postpone_the_deadline() {
    let recorder = RecordingWriter::new();
    let (tx, rx) = mpsc::channel(16);
    let start = Instant::now();
    let handle = tokio::spawn(
        DocumentSyncer::with_writer(identity(), rx, Box::new(recorder.clone())).run(),
    );

    // One record every 300ms, far below the count and size bounds.
    for id in 0..7 {
        tx.send(record(id, 10)).await.unwrap();
        sleep(Duration::from_millis(300)).await;
    }
    drop(tx);
    handle.await.unwrap().unwrap();

    let batches: Vec<_> = recorder.batches().iter().map(|b| ids(b)).collect();
    assert_eq!(
        batches,
        vec![
            vec![json!(0), json!(1), json!(2), json!(3)],
            vec![json!(4), json!(5), json!(6)],
        ]
    );
    let offsets: Vec<_> = recorder
        .written_at()
        .iter()
        .map(|at| *at - start)
        .collect();
    assert_eq!(offsets, vec![Duration::from_secs(1), Duration::from_secs(2)]);
}

#[tokio::test(start_paused = true)]
async fn zero_size_stream_does_not_starve_the_deadline() {
    let recorder = RecordingWriter::new();
    let (tx, rx) = mpsc::channel(64);
    let start = Instant::now();
    let handle = tokio::spawn(
        DocumentSyncer::with_writer(identity(), rx, Box::new(recorder.clone())).run(),
    );

    tx.send(record("real", 4)).await.unwrap();
    for id in 0..20 {
        tx.send(record(id, 0)).await.unwrap();
        sleep(Duration::from_millis(100)).await;
    }

    let batches = recorder.batches();
    assert_eq!(batches.len(), 1);
    assert_eq!(ids(&batches[0]), vec![json!("real")]);
    assert_eq!(recorder.written_at()[0] - start, Duration::from_secs(1));

    drop(tx);
    handle.await.unwrap().unwrap();
    assert_eq!(recorder.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn slow_writer_never_sees_overlapping_writes() {
    let recorder = RecordingWriter::new().with_write_delay(Duration::from_millis(400));
    let inputs = (0..10).map(|id| record(id, 1)).collect();

    let summary = run_prefilled(&recorder, limits(2, 1_000), inputs).await;

    assert_eq!(summary.batches, 5);
    assert_eq!(recorder.call_count(), 5);
    assert_eq!(recorder.max_in_flight(), 1);
}

#[tokio::test(start_paused = true)]
async fn nothing_is_written_when_channel_closes_empty() {
    let recorder = RecordingWriter::new();

    let summary = run_prefilled(&recorder, BatchLimits::default(), Vec::new()).await;

    assert_eq!(summary.batches, 0);
    assert_eq!(recorder.call_count(), 0);
    assert_eq!(recorder.close_count(), 1);
}
