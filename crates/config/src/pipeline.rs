//! Pipeline configuration

use serde::Deserialize;

/// How consumed records reach the writer
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DispatchPolicy {
    /// Hand each record to the writer as it is consumed (default)
    #[default]
    PerRecord,
    /// Accumulate records and flush on threshold or timer
    Batched,
}

/// Ingestion pipeline settings
///
/// # Example
///
/// ```toml
/// [pipeline]
/// capacity = 65536
/// dispatch = "batched"
/// batch_threshold = 5
/// batch_interval_secs = 10
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Ring buffer capacity in slots; must be a power of two
    /// Default: 65536
    pub capacity: usize,

    /// Dispatch policy (per_record, batched)
    /// Default: per_record
    pub dispatch: DispatchPolicy,

    /// Records accumulated before an early flush (batched mode)
    /// Default: 5
    pub batch_threshold: usize,

    /// Seconds between periodic flushes (batched mode)
    /// Default: 10
    pub batch_interval_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            capacity: 64 * 1024,
            dispatch: DispatchPolicy::PerRecord,
            batch_threshold: 5,
            batch_interval_secs: 10,
        }
    }
}
