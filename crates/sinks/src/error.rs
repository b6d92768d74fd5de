//! Sink error types

use thiserror::Error;

/// Errors from the rotating file writer
#[derive(Debug, Error)]
pub enum SinkError {
    /// Failed to create the log directory; the writer cannot function
    #[error("failed to create log directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
