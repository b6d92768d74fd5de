//! Consumer-side dispatch
//!
//! The seam between the pipeline and the file writer. The consumer hands
//! drained records either straight to a [`RecordSink`] or to the
//! [`BatchAccumulator`](crate::BatchAccumulator), depending on the configured
//! policy.

use std::sync::Arc;

use loghive_protocol::LogEntry;
use thiserror::Error;

use crate::batch::BatchAccumulator;

/// Destination for formatted record writes
///
/// Implemented by the rotating file writer. Both calls are non-blocking
/// dispatches; an error means the sink rejected the job (shut down), not
/// that the disk write itself failed.
pub trait RecordSink: Send + Sync {
    /// Dispatch a single-record write
    fn write_one(&self, entry: LogEntry) -> std::result::Result<(), DispatchError>;

    /// Dispatch a multi-record write as one batch
    fn write_many(&self, entries: Vec<LogEntry>) -> std::result::Result<(), DispatchError>;
}

/// A sink refused a dispatched write
#[derive(Debug, Error)]
#[error("sink rejected dispatch: {0}")]
pub struct DispatchError(pub String);

/// Routing policy applied by the consumer thread
///
/// Per-record writes are the default; routing through the accumulator is an
/// explicit configuration choice, never inferred.
pub enum Dispatch {
    /// Every consumed record becomes one single-record write
    PerRecord(Arc<dyn RecordSink>),

    /// Consumed records are collected and flushed in batches
    Batched(Arc<BatchAccumulator>),
}

impl Dispatch {
    pub(crate) fn handle(&self, entry: LogEntry) {
        match self {
            Dispatch::PerRecord(sink) => {
                if let Err(e) = sink.write_one(entry) {
                    // A failed dispatch must never stall the sequence.
                    tracing::error!(error = %e, "write dispatch failed, continuing");
                }
            }
            Dispatch::Batched(accumulator) => accumulator.add(entry),
        }
    }
}
