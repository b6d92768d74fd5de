//! HTTP Source - REST API for log ingestion
//!
//! The single network-facing surface of the collector. Realtime submissions
//! land directly in the ring buffer; bulk uploads go through the archive
//! importer first.
//!
//! # Endpoints
//!
//! - `POST /api/logs/realtime` - one JSON log entry
//! - `POST /api/logs/batch` - multipart ZIP upload (field `file`)
//! - `GET /health` - health check
//!
//! # Example
//!
//! ```ignore
//! use loghive_sources::{BulkImporter, HttpSource, HttpSourceConfig};
//!
//! let importer = Arc::new(BulkImporter::new(producer.clone(), shutdown));
//! let source = HttpSource::new(HttpSourceConfig::with_port(8080), producer, importer);
//! source.run(cancel_token).await?;
//! ```

mod config;
mod error;
mod handlers;
mod metrics;

#[cfg(test)]
mod http_test;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use loghive_pipeline::RingProducer;
use loghive_protocol::LogEntry;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

pub use config::HttpSourceConfig;
pub use error::HttpSourceError;
pub use metrics::{HttpMetricsSnapshot, HttpSourceMetrics};

use crate::archive::BulkImporter;
use handlers::{health_check, ingest_batch, ingest_realtime, HandlerState};

/// HTTP source for REST ingestion
pub struct HttpSource {
    config: HttpSourceConfig,
    producer: RingProducer<LogEntry>,
    importer: Arc<BulkImporter>,
    metrics: Arc<HttpSourceMetrics>,
}

impl HttpSource {
    /// Create a new HTTP source
    pub fn new(
        config: HttpSourceConfig,
        producer: RingProducer<LogEntry>,
        importer: Arc<BulkImporter>,
    ) -> Self {
        Self {
            config,
            producer,
            importer,
            metrics: Arc::new(HttpSourceMetrics::new()),
        }
    }

    /// Get reference to metrics
    pub fn metrics(&self) -> &Arc<HttpSourceMetrics> {
        &self.metrics
    }

    /// Run the HTTP source
    ///
    /// Binds to the configured address and accepts requests until the token
    /// is cancelled or an unrecoverable error occurs.
    pub async fn run(self, cancel: CancellationToken) -> Result<(), HttpSourceError> {
        let bind_addr = self.config.bind_address();

        let listener = TcpListener::bind(&bind_addr)
            .await
            .map_err(|e| HttpSourceError::Bind {
                address: bind_addr.clone(),
                source: e,
            })?;

        tracing::info!(address = %bind_addr, "HTTP source listening");

        let state = Arc::new(HandlerState {
            producer: self.producer.clone(),
            importer: Arc::clone(&self.importer),
            metrics: Arc::clone(&self.metrics),
        });

        let app = build_router(state, self.config.max_upload_size);

        let server =
            axum::serve(listener, app).with_graceful_shutdown(shutdown_signal(cancel.clone()));

        let result = server.await.map_err(|e| HttpSourceError::Http(e.to_string()));

        tracing::info!("HTTP source stopped");

        result
    }
}

/// Build the axum router
fn build_router(state: Arc<HandlerState>, max_upload_size: usize) -> Router {
    Router::new()
        .route("/api/logs/realtime", post(ingest_realtime))
        .route("/api/logs/batch", post(ingest_batch))
        .route("/health", get(health_check))
        .layer(DefaultBodyLimit::max(max_upload_size))
        .with_state(state)
}

/// Shutdown signal future
async fn shutdown_signal(cancel: CancellationToken) {
    cancel.cancelled().await;
}
