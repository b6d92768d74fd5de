//! Loghive - Sources
//!
//! Ingress for the pipeline: the HTTP transport (realtime JSON submissions
//! and bulk ZIP uploads) and the retrying bulk archive importer.
//!
//! Both paths converge on the same ring buffer, so a record imported from an
//! archive has identical downstream semantics to one submitted in realtime.
//!
//! # Endpoints
//!
//! - `POST /api/logs/realtime` - one JSON log entry
//! - `POST /api/logs/batch` - multipart ZIP upload (field `file`)
//! - `GET /health` - liveness check

mod archive;
pub mod http;

pub use archive::{BulkImporter, ImportError, ImportReport};
pub use http::{HttpSource, HttpSourceConfig, HttpSourceError};
