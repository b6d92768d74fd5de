//! HTTP route handlers
//!
//! Axum handlers for realtime and bulk ingestion.
//!
//! # Endpoints
//!
//! - `/api/logs/realtime` - single JSON log entry
//! - `/api/logs/batch` - multipart ZIP upload
//! - `/health` - health check

use std::io::Cursor;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use loghive_pipeline::RingProducer;
use loghive_protocol::LogEntry;

use super::metrics::HttpSourceMetrics;
use crate::archive::BulkImporter;

/// Shared state for handlers
pub struct HandlerState {
    pub producer: RingProducer<LogEntry>,
    pub importer: Arc<BulkImporter>,
    pub metrics: Arc<HttpSourceMetrics>,
}

/// POST /api/logs/realtime - Ingest one JSON log entry
///
/// Blocks (off the async runtime) while the ingestion buffer is full, so a
/// saturated pipeline surfaces as slow responses rather than dropped records.
pub async fn ingest_realtime(
    State(state): State<Arc<HandlerState>>,
    payload: Result<Json<LogEntry>, JsonRejection>,
) -> Response {
    state.metrics.request_received();

    let Json(entry) = match payload {
        Ok(json) => json,
        Err(e) => {
            state.metrics.request_client_error();
            return (StatusCode::BAD_REQUEST, format!("Invalid log entry: {e}"))
                .into_response();
        }
    };

    if let Err(e) = entry.validate() {
        state.metrics.request_client_error();
        return (StatusCode::BAD_REQUEST, format!("Invalid log entry: {e}")).into_response();
    }

    let producer = state.producer.clone();
    let pushed = tokio::task::spawn_blocking(move || producer.push(entry)).await;

    match pushed {
        Ok(Ok(())) => {
            state.metrics.records_processed(1, 0);
            state.metrics.request_success();
            (StatusCode::OK, "Success").into_response()
        }
        Ok(Err(e)) => {
            state.metrics.request_server_error();
            tracing::error!(error = %e, "realtime ingestion failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to process log: {e}"),
            )
                .into_response()
        }
        Err(e) => {
            state.metrics.request_server_error();
            tracing::error!(error = %e, "realtime ingestion task panicked");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to process log: {e}"),
            )
                .into_response()
        }
    }
}

/// POST /api/logs/batch - Ingest a ZIP archive of log lines
///
/// Expects a multipart form with the archive under the `file` field. The
/// import (with its retry loop) runs on the blocking pool; the response is
/// sent once the whole archive has been republished.
pub async fn ingest_batch(
    State(state): State<Arc<HandlerState>>,
    mut multipart: Multipart,
) -> Response {
    state.metrics.request_received();

    let data = loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some("file") => match field.bytes().await {
                Ok(bytes) => break bytes,
                Err(e) => {
                    state.metrics.request_client_error();
                    return (StatusCode::BAD_REQUEST, format!("Invalid upload: {e}"))
                        .into_response();
                }
            },
            Ok(Some(_)) => continue,
            Ok(None) => {
                state.metrics.request_client_error();
                return (
                    StatusCode::BAD_REQUEST,
                    "Missing multipart field 'file'".to_string(),
                )
                    .into_response();
            }
            Err(e) => {
                state.metrics.request_client_error();
                return (StatusCode::BAD_REQUEST, format!("Invalid upload: {e}"))
                    .into_response();
            }
        }
    };

    state.metrics.bytes_received(data.len() as u64);

    let importer = Arc::clone(&state.importer);
    let imported =
        tokio::task::spawn_blocking(move || importer.import(|| Ok(Cursor::new(data.clone()))))
            .await;

    match imported {
        Ok(Ok(report)) => {
            state
                .metrics
                .records_processed(report.imported, report.skipped);
            state.metrics.request_success();
            (StatusCode::OK, "Success").into_response()
        }
        Ok(Err(e)) => {
            state.metrics.request_server_error();
            tracing::error!(error = %e, "bulk ingestion failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to process batch logs: {e}"),
            )
                .into_response()
        }
        Err(e) => {
            state.metrics.request_server_error();
            tracing::error!(error = %e, "bulk ingestion task panicked");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to process batch logs: {e}"),
            )
                .into_response()
        }
    }
}

/// GET /health - Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({"status": "ok"})))
}
