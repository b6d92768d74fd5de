//! Pipeline error types

use thiserror::Error;

/// Pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The ring buffer has been closed for new records
    #[error("ingestion buffer is closed")]
    Closed,

    /// A background thread could not be spawned
    #[error("failed to spawn pipeline thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PipelineError::Closed;
        assert!(err.to_string().contains("closed"));

        let err = PipelineError::Spawn(std::io::Error::other("no threads"));
        assert!(err.to_string().contains("no threads"));
    }
}
