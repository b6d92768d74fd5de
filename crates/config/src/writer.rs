//! Rotating writer configuration

use serde::Deserialize;

/// Rotating file writer settings
///
/// # Example
///
/// ```toml
/// [writer]
/// directory = "logs"
/// file_prefix = "client"
/// workers = 4
/// shutdown_grace_secs = 10
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    /// Output directory, created at startup if absent
    /// Default: "logs"
    pub directory: String,

    /// File name prefix for rotated files
    /// Default: "client"
    pub file_prefix: String,

    /// Writer worker threads; 0 = number of CPU cores
    /// Default: 0
    pub workers: usize,

    /// Seconds to wait for queued writes to drain at shutdown
    /// Default: 10
    pub shutdown_grace_secs: u64,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            directory: "logs".into(),
            file_prefix: "client".into(),
            workers: 0,
            shutdown_grace_secs: 10,
        }
    }
}
