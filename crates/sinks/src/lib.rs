//! Loghive - Sinks
//!
//! Disk output for the ingestion pipeline: a rotating plaintext writer that
//! appends one pipe-delimited line per record to hour-bucketed files.
//!
//! # Output Format
//!
//! ```text
//! logs/
//! ├── client_20240101_14.log
//! ├── client_20240101_15.log
//! └── client_20240102_00.log
//! ```
//!
//! One record per line, fields as defined by `loghive_protocol`:
//!
//! ```text
//! id|ip|2024-01-01 14:03:07|name|42|-|-
//! ```
//!
//! # Design
//!
//! - **Non-blocking dispatch**: `write_one` / `write_many` queue a job for a
//!   bounded pool of writer threads; callers never block on disk I/O.
//! - **Hour rotation**: the current file path is resolved per job under one
//!   mutex; a changed hour bucket selects a new file, existing files from a
//!   prior run are reused.
//! - **Single append per call**: the byte append happens outside the lock as
//!   one `write_all`, so concurrent jobs interleave at line granularity only.
//! - **Graceful drain**: shutdown waits a bounded grace period for queued
//!   jobs, then abandons the remainder.

mod error;
mod rotating;

pub use error::SinkError;
pub use rotating::{
    file_name_for, RotatingWriter, RotatingWriterConfig, WriterMetrics, WriterMetricsSnapshot,
};
