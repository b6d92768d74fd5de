//! Loghive - Protocol
//!
//! The canonical `LogEntry` record that flows through the ingestion pipeline,
//! plus the pipe-delimited line format used both on disk and in bulk-import
//! archives.
//!
//! # Line Format
//!
//! Disk output (7 fields, stable contract for downstream readers):
//!
//! ```text
//! id|ip|2024-01-01 00:00:00|name|42|120|15
//! ```
//!
//! Archive input (5 fields, optional timings absent):
//!
//! ```text
//! id|ip|2024-01-01 00:00:00|name|42
//! ```
//!
//! Optional numeric fields render as the `-` sentinel when unset; formatting
//! never fails on an absent value.

mod entry;
mod error;

pub use entry::LogEntry;
pub use error::ParseLineError;

/// Textual timestamp format used in JSON bodies, archive lines and disk lines
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Sentinel rendered for unset optional numeric fields
pub const UNSET_FIELD: &str = "-";

/// Field count of an archive input line
pub const ARCHIVE_FIELD_COUNT: usize = 5;

/// Field count of a disk output line
pub const LINE_FIELD_COUNT: usize = 7;
