use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use loghive_protocol::LogEntry;
use parking_lot::Mutex;

use super::*;
use crate::dispatch::{Dispatch, DispatchError, RecordSink};
use crate::ring;

/// Sink that captures single-record writes, optionally failing first
struct CaptureSink {
    ones: Mutex<Vec<LogEntry>>,
    failures_remaining: AtomicU64,
}

impl CaptureSink {
    fn new() -> Self {
        Self {
            ones: Mutex::new(Vec::new()),
            failures_remaining: AtomicU64::new(0),
        }
    }

    fn failing_first(n: u64) -> Self {
        Self {
            ones: Mutex::new(Vec::new()),
            failures_remaining: AtomicU64::new(n),
        }
    }
}

impl RecordSink for CaptureSink {
    fn write_one(&self, entry: LogEntry) -> Result<(), DispatchError> {
        loop {
            let remaining = self.failures_remaining.load(Ordering::SeqCst);
            if remaining == 0 {
                break;
            }
            if self
                .failures_remaining
                .compare_exchange(remaining, remaining - 1, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
            {
                return Err(DispatchError("injected failure".into()));
            }
        }
        self.ones.lock().push(entry);
        Ok(())
    }

    fn write_many(&self, _entries: Vec<LogEntry>) -> Result<(), DispatchError> {
        Ok(())
    }
}

fn entry(id: &str) -> LogEntry {
    LogEntry {
        id: id.into(),
        ip: "1.2.3.4".into(),
        event_time: NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap(),
        name: "svc".into(),
        random_number: 42,
        process_time: None,
        delay_time: None,
    }
}

#[test]
fn test_consumer_preserves_submission_order() {
    let (tx, rx) = ring(16);
    let sink = Arc::new(CaptureSink::new());
    let consumer = Consumer::spawn(rx, Dispatch::PerRecord(sink.clone() as Arc<dyn RecordSink>)).unwrap();

    for i in 0..100 {
        tx.push(entry(&format!("e{i}"))).unwrap();
    }
    tx.close();
    assert_eq!(consumer.join(), 100);

    let ones = sink.ones.lock();
    assert_eq!(ones.len(), 100);
    for (i, e) in ones.iter().enumerate() {
        assert_eq!(e.id, format!("e{i}"));
    }
}

#[test]
fn test_write_failure_does_not_stall_sequence() {
    let (tx, rx) = ring(16);
    let sink = Arc::new(CaptureSink::failing_first(2));
    let consumer = Consumer::spawn(rx, Dispatch::PerRecord(sink.clone() as Arc<dyn RecordSink>)).unwrap();

    for i in 0..5 {
        tx.push(entry(&format!("e{i}"))).unwrap();
    }
    tx.close();

    // All five records are consumed even though the first two writes failed.
    assert_eq!(consumer.join(), 5);
    assert_eq!(sink.ones.lock().len(), 3);
}

#[test]
fn test_batched_dispatch_routes_through_accumulator() {
    let (tx, rx) = ring(16);
    let sink = Arc::new(CaptureSink::new());
    let accumulator = Arc::new(crate::BatchAccumulator::new(sink.clone() as Arc<dyn RecordSink>, 3));
    let consumer = Consumer::spawn(rx, Dispatch::Batched(Arc::clone(&accumulator))).unwrap();

    for i in 0..2 {
        tx.push(entry(&format!("e{i}"))).unwrap();
    }
    tx.close();
    consumer.join();

    // Below threshold: records are pending in the accumulator, not written.
    assert_eq!(accumulator.pending_len(), 2);
    assert!(sink.ones.lock().is_empty());
}
