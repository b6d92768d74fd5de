//! Bulk archive import
//!
//! Reads a ZIP container of newline-delimited log lines, parses each line
//! and republishes parsed records through the ingestion buffer. The whole
//! archive read is retried on I/O failure with linear backoff; malformed
//! lines are skipped, never fatal.

use std::io::{self, BufRead, BufReader, Read, Seek};
use std::sync::Arc;
use std::time::Duration;

use loghive_pipeline::{RingProducer, Shutdown};
use loghive_protocol::LogEntry;
use thiserror::Error;
use zip::result::ZipError;
use zip::ZipArchive;

/// Maximum archive read attempts
pub const MAX_IMPORT_ATTEMPTS: u32 = 3;

/// Backoff unit; attempt N waits N of these before retrying
pub const BACKOFF_UNIT: Duration = Duration::from_secs(1);

/// Outcome of a successful import
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportReport {
    /// Records parsed and republished through the buffer
    pub imported: u64,

    /// Malformed lines logged and skipped
    pub skipped: u64,

    /// Attempts taken, including the successful one
    pub attempts: u32,
}

/// Errors from bulk import
#[derive(Debug, Error)]
pub enum ImportError {
    /// Every attempt failed on I/O; nothing more will be retried
    #[error("archive import failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: io::Error,
    },

    /// Shutdown was signalled during a backoff wait
    #[error("import aborted during retry backoff")]
    Interrupted,

    /// The ingestion buffer was closed mid-import
    #[error("ingestion buffer closed during import")]
    PipelineClosed,
}

/// Per-attempt failure, before retry policy is applied
enum AttemptError {
    Io(io::Error),
    PipelineClosed,
}

impl From<ZipError> for AttemptError {
    fn from(err: ZipError) -> Self {
        match err {
            ZipError::Io(io) => AttemptError::Io(io),
            other => AttemptError::Io(io::Error::new(io::ErrorKind::InvalidData, other)),
        }
    }
}

/// Republishes archive records through the ingestion buffer with retry
pub struct BulkImporter {
    producer: RingProducer<LogEntry>,
    shutdown: Arc<Shutdown>,
    max_attempts: u32,
    backoff_unit: Duration,
}

impl BulkImporter {
    /// Create an importer feeding `producer`
    ///
    /// Backoff waits block on `shutdown` so an import aborts promptly when
    /// the process stops.
    pub fn new(producer: RingProducer<LogEntry>, shutdown: Arc<Shutdown>) -> Self {
        Self {
            producer,
            shutdown,
            max_attempts: MAX_IMPORT_ATTEMPTS,
            backoff_unit: BACKOFF_UNIT,
        }
    }

    /// Override the backoff unit (shortened in tests)
    #[must_use]
    pub fn with_backoff_unit(mut self, unit: Duration) -> Self {
        self.backoff_unit = unit;
        self
    }

    /// Import an archive, opening a fresh reader per attempt
    ///
    /// `open` is called once per attempt so a transient stream failure can
    /// be retried from the start. Parse failures are skipped and counted;
    /// only I/O failures trigger the retry loop.
    pub fn import<R, F>(&self, mut open: F) -> Result<ImportReport, ImportError>
    where
        R: Read + Seek,
        F: FnMut() -> io::Result<R>,
    {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.try_import(&mut open) {
                Ok((imported, skipped)) => {
                    tracing::info!(imported, skipped, attempt, "bulk import complete");
                    return Ok(ImportReport {
                        imported,
                        skipped,
                        attempts: attempt,
                    });
                }
                Err(AttemptError::PipelineClosed) => return Err(ImportError::PipelineClosed),
                Err(AttemptError::Io(source)) => {
                    if attempt >= self.max_attempts {
                        tracing::error!(
                            attempts = attempt,
                            error = %source,
                            "bulk import failed, giving up"
                        );
                        return Err(ImportError::RetriesExhausted {
                            attempts: attempt,
                            source,
                        });
                    }

                    let backoff = self.backoff_unit * attempt;
                    tracing::warn!(
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %source,
                        "bulk import failed, retrying"
                    );
                    if self.shutdown.wait_for(backoff) {
                        return Err(ImportError::Interrupted);
                    }
                }
            }
        }
    }

    /// Run one full archive read
    fn try_import<R, F>(&self, open: &mut F) -> Result<(u64, u64), AttemptError>
    where
        R: Read + Seek,
        F: FnMut() -> io::Result<R>,
    {
        let reader = open().map_err(AttemptError::Io)?;
        let mut container = ZipArchive::new(reader)?;

        let mut imported = 0u64;
        let mut skipped = 0u64;

        for index in 0..container.len() {
            let entry = container.by_index(index)?;
            let entry_name = entry.name().to_owned();

            for line in BufReader::new(entry).lines() {
                let line = line.map_err(AttemptError::Io)?;
                if line.trim().is_empty() {
                    continue;
                }
                match LogEntry::parse_line(&line) {
                    Ok(record) => {
                        self.producer
                            .push(record)
                            .map_err(|_| AttemptError::PipelineClosed)?;
                        imported += 1;
                    }
                    Err(e) => {
                        skipped += 1;
                        tracing::warn!(
                            entry = %entry_name,
                            error = %e,
                            line = %line,
                            "skipping malformed archive line"
                        );
                    }
                }
            }
        }

        Ok((imported, skipped))
    }
}

#[cfg(test)]
#[path = "archive_test.rs"]
mod archive_test;
