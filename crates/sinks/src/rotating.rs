//! Rotating file writer
//!
//! Appends formatted records to the file for the current hour bucket. Write
//! jobs are dispatched to a fixed pool of worker threads so the pipeline
//! never blocks on disk I/O; per-job failures are logged and swallowed.

use std::collections::VecDeque;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use loghive_pipeline::{DispatchError, RecordSink};
use loghive_protocol::LogEntry;
use parking_lot::{Condvar, Mutex};

use crate::error::SinkError;

/// Configuration for the rotating writer
#[derive(Debug, Clone)]
pub struct RotatingWriterConfig {
    /// Output directory, created idempotently at startup
    pub directory: PathBuf,

    /// File name prefix (`client` -> `client_20240101_14.log`)
    pub file_prefix: String,

    /// Writer thread count; 0 uses available parallelism
    pub workers: usize,

    /// How long shutdown waits for queued jobs before abandoning them
    pub shutdown_grace: Duration,
}

impl Default for RotatingWriterConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("logs"),
            file_prefix: "client".into(),
            workers: 0,
            shutdown_grace: Duration::from_secs(10),
        }
    }
}

impl RotatingWriterConfig {
    /// Create config with a custom output directory
    #[must_use]
    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = directory.into();
        self
    }

    /// Create config with a custom file prefix
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_prefix = prefix.into();
        self
    }

    /// Create config with a fixed worker count
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Create config with a custom shutdown drain window
    #[must_use]
    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }
}

/// Build the file name for a prefix and timestamp: `<prefix>_<YYYYMMDD>_<HH>.log`
pub fn file_name_for(prefix: &str, timestamp: NaiveDateTime) -> String {
    format!(
        "{}_{}_{:02}.log",
        prefix,
        timestamp.date().format("%Y%m%d"),
        timestamp.hour()
    )
}

/// Metrics for the rotating writer
#[derive(Debug, Default)]
pub struct WriterMetrics {
    /// Jobs accepted into the queue
    pub jobs_submitted: AtomicU64,

    /// Lines appended to disk
    pub lines_written: AtomicU64,

    /// Bytes appended to disk
    pub bytes_written: AtomicU64,

    /// Failed write jobs
    pub write_errors: AtomicU64,

    /// Jobs dropped when the shutdown grace period elapsed
    pub jobs_abandoned: AtomicU64,
}

impl WriterMetrics {
    fn record_write(&self, lines: u64, bytes: u64) {
        self.lines_written.fetch_add(lines, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Get a point-in-time snapshot
    pub fn snapshot(&self) -> WriterMetricsSnapshot {
        WriterMetricsSnapshot {
            jobs_submitted: self.jobs_submitted.load(Ordering::Relaxed),
            lines_written: self.lines_written.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            write_errors: self.write_errors.load(Ordering::Relaxed),
            jobs_abandoned: self.jobs_abandoned.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of writer metrics
#[derive(Debug, Clone, Copy, Default)]
pub struct WriterMetricsSnapshot {
    pub jobs_submitted: u64,
    pub lines_written: u64,
    pub bytes_written: u64,
    pub write_errors: u64,
    pub jobs_abandoned: u64,
}

/// A queued write
#[derive(Debug)]
enum WriteJob {
    One(LogEntry),
    Many(Vec<LogEntry>),
}

impl WriteJob {
    fn entries(&self) -> &[LogEntry] {
        match self {
            WriteJob::One(entry) => std::slice::from_ref(entry),
            WriteJob::Many(entries) => entries,
        }
    }
}

/// Calendar date + hour key selecting the current output file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HourBucket {
    date: NaiveDate,
    hour: u32,
}

impl HourBucket {
    fn of(timestamp: NaiveDateTime) -> Self {
        Self {
            date: timestamp.date(),
            hour: timestamp.hour(),
        }
    }
}

#[derive(Debug)]
struct CurrentFile {
    bucket: HourBucket,
    path: PathBuf,
}

#[derive(Debug)]
struct QueueState {
    jobs: VecDeque<WriteJob>,
    /// Jobs popped but not yet completed
    active: usize,
    closed: bool,
}

#[derive(Debug)]
struct Shared {
    config: RotatingWriterConfig,
    queue: Mutex<QueueState>,
    job_ready: Condvar,
    queue_idle: Condvar,

    /// The only cross-thread mutable state outside the queue: the current
    /// file pointer and its hour bucket, owned exclusively by this writer.
    current: Mutex<Option<CurrentFile>>,

    metrics: WriterMetrics,
}

impl Shared {
    /// Resolve the output path for `now`, rotating if the hour changed
    fn resolve_current(&self, now: NaiveDateTime) -> PathBuf {
        let bucket = HourBucket::of(now);
        let mut current = self.current.lock();
        match current.as_ref() {
            Some(file) if file.bucket == bucket => file.path.clone(),
            previous => {
                let path = self
                    .config
                    .directory
                    .join(file_name_for(&self.config.file_prefix, now));
                tracing::info!(
                    path = %path.display(),
                    rotated = previous.is_some(),
                    "selected current log file"
                );
                *current = Some(CurrentFile {
                    bucket,
                    path: path.clone(),
                });
                path
            }
        }
    }

    /// Format and append a job's records at the given time
    ///
    /// The append is one `write_all` outside the resolution lock, so
    /// concurrent jobs interleave at line granularity only. The file is
    /// created on first append and reused if it already exists.
    fn write_at(&self, now: NaiveDateTime, job: &WriteJob) -> io::Result<()> {
        let path = self.resolve_current(now);

        let entries = job.entries();
        let mut payload = String::with_capacity(entries.len() * 80);
        for entry in entries {
            payload.push_str(&entry.to_line());
            payload.push('\n');
        }

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        file.write_all(payload.as_bytes())?;

        self.metrics
            .record_write(entries.len() as u64, payload.len() as u64);
        Ok(())
    }
}

/// Hour-rotating plaintext log writer
///
/// Owns the "current file" state and a pool of writer threads. Dispatch via
/// [`RecordSink`] never blocks on I/O.
#[derive(Debug)]
pub struct RotatingWriter {
    shared: Arc<Shared>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl RotatingWriter {
    /// Create the writer, its output directory and its worker pool
    ///
    /// Directory creation is idempotent; failure is fatal since nothing can
    /// be written without it.
    pub fn new(config: RotatingWriterConfig) -> Result<Self, SinkError> {
        fs::create_dir_all(&config.directory).map_err(|source| SinkError::CreateDir {
            path: config.directory.display().to_string(),
            source,
        })?;

        let worker_count = if config.workers == 0 {
            thread::available_parallelism().map(usize::from).unwrap_or(4)
        } else {
            config.workers
        };

        let shared = Arc::new(Shared {
            config,
            queue: Mutex::new(QueueState {
                jobs: VecDeque::new(),
                active: 0,
                closed: false,
            }),
            job_ready: Condvar::new(),
            queue_idle: Condvar::new(),
            current: Mutex::new(None),
            metrics: WriterMetrics::default(),
        });

        let mut workers = Vec::with_capacity(worker_count);
        for i in 0..worker_count {
            let shared = Arc::clone(&shared);
            let handle = thread::Builder::new()
                .name(format!("log-writer-{i}"))
                .spawn(move || worker_loop(&shared))
                .map_err(SinkError::Io)?;
            workers.push(handle);
        }

        tracing::info!(
            directory = %shared.config.directory.display(),
            workers = worker_count,
            "rotating writer started"
        );

        Ok(Self {
            shared,
            workers: Mutex::new(workers),
        })
    }

    /// Get reference to metrics
    pub fn metrics(&self) -> &WriterMetrics {
        &self.shared.metrics
    }

    fn submit(&self, job: WriteJob) -> Result<(), DispatchError> {
        let mut queue = self.shared.queue.lock();
        if queue.closed {
            return Err(DispatchError("writer is shut down".into()));
        }
        queue.jobs.push_back(job);
        self.shared
            .metrics
            .jobs_submitted
            .fetch_add(1, Ordering::Relaxed);
        self.shared.job_ready.notify_one();
        Ok(())
    }

    /// Close the queue and drain it within the configured grace period
    ///
    /// Jobs still queued when the grace period elapses are abandoned and
    /// counted; worker threads are joined either way. Idempotent.
    pub fn shutdown(&self) {
        {
            let mut queue = self.shared.queue.lock();
            if queue.closed {
                return;
            }
            queue.closed = true;
            self.shared.job_ready.notify_all();

            let deadline = Instant::now() + self.shared.config.shutdown_grace;
            while !(queue.jobs.is_empty() && queue.active == 0) {
                if self
                    .shared
                    .queue_idle
                    .wait_until(&mut queue, deadline)
                    .timed_out()
                {
                    let abandoned = queue.jobs.len() as u64;
                    queue.jobs.clear();
                    self.shared
                        .metrics
                        .jobs_abandoned
                        .fetch_add(abandoned, Ordering::Relaxed);
                    tracing::warn!(abandoned, "shutdown grace elapsed, abandoning queued writes");
                    break;
                }
            }
        }

        for handle in self.workers.lock().drain(..) {
            let _ = handle.join();
        }

        let snapshot = self.shared.metrics.snapshot();
        tracing::info!(
            lines = snapshot.lines_written,
            bytes = snapshot.bytes_written,
            errors = snapshot.write_errors,
            abandoned = snapshot.jobs_abandoned,
            "rotating writer stopped"
        );
    }
}

impl RecordSink for RotatingWriter {
    fn write_one(&self, entry: LogEntry) -> Result<(), DispatchError> {
        self.submit(WriteJob::One(entry))
    }

    fn write_many(&self, entries: Vec<LogEntry>) -> Result<(), DispatchError> {
        if entries.is_empty() {
            return Ok(());
        }
        self.submit(WriteJob::Many(entries))
    }
}

fn worker_loop(shared: &Shared) {
    loop {
        let job = {
            let mut queue = shared.queue.lock();
            loop {
                if let Some(job) = queue.jobs.pop_front() {
                    queue.active += 1;
                    break job;
                }
                if queue.closed {
                    return;
                }
                shared.job_ready.wait(&mut queue);
            }
        };

        let now = chrono::Local::now().naive_local();
        if let Err(e) = shared.write_at(now, &job) {
            shared.metrics.write_errors.fetch_add(1, Ordering::Relaxed);
            tracing::error!(error = %e, "log file write failed");
        }

        let mut queue = shared.queue.lock();
        queue.active -= 1;
        if queue.jobs.is_empty() && queue.active == 0 {
            shared.queue_idle.notify_all();
        }
    }
}

#[cfg(test)]
#[path = "rotating_test.rs"]
mod rotating_test;
