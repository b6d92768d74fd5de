//! Batch accumulator with size- and time-driven flushing
//!
//! Collects records under one mutex and flushes them as a single batch write
//! when the size threshold is reached. An independent timer thread flushes
//! on a fixed period regardless of size, so a slow trickle of records never
//! sits in memory for long.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use loghive_protocol::LogEntry;
use parking_lot::Mutex;

use crate::dispatch::RecordSink;
use crate::shutdown::Shutdown;

/// Accumulates records and flushes them as batch writes
pub struct BatchAccumulator {
    pending: Mutex<Vec<LogEntry>>,
    sink: Arc<dyn RecordSink>,
    threshold: usize,
}

impl BatchAccumulator {
    /// Create an accumulator flushing to `sink` at `threshold` records
    pub fn new(sink: Arc<dyn RecordSink>, threshold: usize) -> Self {
        Self {
            pending: Mutex::new(Vec::with_capacity(threshold)),
            sink,
            threshold,
        }
    }

    /// Append a record, flushing immediately if the threshold is reached
    ///
    /// `add` and `flush` contend on the same lock, so no record can be lost
    /// or duplicated across a concurrent add/flush race.
    pub fn add(&self, entry: LogEntry) {
        let full = {
            let mut pending = self.pending.lock();
            pending.push(entry);
            if pending.len() >= self.threshold {
                Some(std::mem::take(&mut *pending))
            } else {
                None
            }
        };

        if let Some(batch) = full {
            self.dispatch(batch);
        }
    }

    /// Flush all pending records as one batch write; no-op when empty
    pub fn flush(&self) {
        let batch = {
            let mut pending = self.pending.lock();
            if pending.is_empty() {
                return;
            }
            std::mem::take(&mut *pending)
        };
        self.dispatch(batch);
    }

    /// Number of records currently pending
    pub fn pending_len(&self) -> usize {
        self.pending.lock().len()
    }

    fn dispatch(&self, batch: Vec<LogEntry>) {
        tracing::debug!(records = batch.len(), "flushing batch");
        if let Err(e) = self.sink.write_many(batch) {
            tracing::error!(error = %e, "batch write dispatch failed");
        }
    }
}

/// Periodic flush driver for a [`BatchAccumulator`]
///
/// Runs on its own thread; the first flush fires one full period after
/// start. Stopping is cooperative: the shutdown signal interrupts the wait
/// and a final flush runs before the thread exits.
pub struct FlushTimer {
    handle: Option<JoinHandle<()>>,
}

impl FlushTimer {
    /// Spawn the timer thread
    pub fn start(
        accumulator: Arc<BatchAccumulator>,
        period: Duration,
        shutdown: Arc<Shutdown>,
    ) -> io::Result<Self> {
        let handle = thread::Builder::new()
            .name("batch-flush".into())
            .spawn(move || {
                loop {
                    if shutdown.wait_for(period) {
                        break;
                    }
                    accumulator.flush();
                }
                // Drain whatever is pending before exiting.
                accumulator.flush();
                tracing::debug!("flush timer stopped");
            })?;

        Ok(Self {
            handle: Some(handle),
        })
    }

    /// Wait for the timer thread to exit
    ///
    /// The shutdown signal passed to [`start`](Self::start) must already be
    /// triggered, otherwise this blocks until it is.
    pub fn stop(mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
#[path = "batch_test.rs"]
mod batch_test;
