//! HTTP source tests

use std::io::{Cursor, Write};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use loghive_pipeline::{ring, RingConsumer, Shutdown};
use loghive_protocol::LogEntry;
use tower::ServiceExt;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use super::handlers::HandlerState;
use super::*;
use crate::archive::BulkImporter;

/// Test context holding the consumer end of the buffer
struct TestContext {
    state: Arc<HandlerState>,
    consumer: RingConsumer<LogEntry>,
}

fn test_context() -> TestContext {
    let (producer, consumer) = ring(64);
    let importer = Arc::new(
        BulkImporter::new(producer.clone(), Arc::new(Shutdown::new()))
            .with_backoff_unit(Duration::from_millis(1)),
    );

    let state = Arc::new(HandlerState {
        producer,
        importer,
        metrics: Arc::new(HttpSourceMetrics::new()),
    });

    TestContext { state, consumer }
}

/// Pop one record off the blocking pool
async fn recv(mut consumer: RingConsumer<LogEntry>) -> (Option<LogEntry>, RingConsumer<LogEntry>) {
    tokio::task::spawn_blocking(move || {
        let value = consumer.pop();
        (value, consumer)
    })
    .await
    .unwrap()
}

fn realtime_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/logs/realtime")
        .header("content-type", "application/json")
        .body(Body::from(body.to_owned()))
        .unwrap()
}

fn zip_bytes(content: &str) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("upload.log", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(content.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

const BOUNDARY: &str = "loghive-test-boundary";

fn batch_request(field_name: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{field_name}\"; filename=\"logs.zip\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/zip\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/logs/batch")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

// =============================================================================
// Health check
// =============================================================================

#[tokio::test]
async fn test_health_check() {
    let ctx = test_context();
    let app = build_router(ctx.state, 1024);

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["status"], "ok");
}

// =============================================================================
// Realtime ingestion
// =============================================================================

#[tokio::test]
async fn test_realtime_entry_lands_in_buffer() {
    let ctx = test_context();
    let app = build_router(Arc::clone(&ctx.state), 1024);

    let body = r#"{"id":"req-1","ip":"1.2.3.4","eventTime":"2024-01-01 12:00:00","name":"svc","randomNumber":7}"#;
    let response = app.oneshot(realtime_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "Success");

    let (record, _consumer) = recv(ctx.consumer).await;
    let record = record.unwrap();
    assert_eq!(record.id, "req-1");
    assert_eq!(record.random_number, 7);
    assert_eq!(record.process_time, None);
    assert_eq!(record.delay_time, None);
}

#[tokio::test]
async fn test_realtime_malformed_json_is_rejected() {
    let ctx = test_context();
    let app = build_router(ctx.state, 1024);

    let response = app.oneshot(realtime_request("{not json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_realtime_empty_mandatory_field_is_rejected() {
    let ctx = test_context();
    let app = build_router(Arc::clone(&ctx.state), 1024);

    let body =
        r#"{"id":"","ip":"1.2.3.4","eventTime":"2024-01-01 12:00:00","name":"svc","randomNumber":7}"#;
    let response = app.oneshot(realtime_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(ctx.state.metrics.snapshot().requests_client_error, 1);
}

#[tokio::test]
async fn test_realtime_on_closed_buffer_is_server_error() {
    let ctx = test_context();
    let app = build_router(ctx.state, 1024);
    drop(ctx.consumer);

    let body = r#"{"id":"req-1","ip":"1.2.3.4","eventTime":"2024-01-01 12:00:00","name":"svc","randomNumber":7}"#;
    let response = app.oneshot(realtime_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_string(response)
        .await
        .starts_with("Failed to process log:"));
}

#[tokio::test]
async fn test_realtime_oversize_body_is_rejected() {
    let ctx = test_context();
    let app = build_router(ctx.state, 64);

    let padding = "x".repeat(512);
    let body = format!(
        r#"{{"id":"{padding}","ip":"1.2.3.4","eventTime":"2024-01-01 12:00:00","name":"svc","randomNumber":7}}"#
    );
    let response = app.oneshot(realtime_request(&body)).await.unwrap();

    assert!(response.status().is_client_error());
}

// =============================================================================
// Bulk ingestion
// =============================================================================

#[tokio::test]
async fn test_batch_upload_imports_archive() {
    let ctx = test_context();
    let app = build_router(Arc::clone(&ctx.state), 10 * 1024 * 1024);

    let archive = zip_bytes(
        "a|1.2.3.4|2024-01-01 00:00:00|svc|1\nb|1.2.3.4|2024-01-01 00:00:01|svc|2\n",
    );
    let response = app.oneshot(batch_request("file", &archive)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "Success");

    let (first, consumer) = recv(ctx.consumer).await;
    let (second, _consumer) = recv(consumer).await;
    assert_eq!(first.unwrap().id, "a");
    assert_eq!(second.unwrap().id, "b");

    let snapshot = ctx.state.metrics.snapshot();
    assert_eq!(snapshot.records_accepted, 2);
    assert_eq!(snapshot.records_skipped, 0);
}

#[tokio::test]
async fn test_batch_upload_counts_skipped_lines() {
    let ctx = test_context();
    let app = build_router(Arc::clone(&ctx.state), 10 * 1024 * 1024);

    let archive = zip_bytes("a|1.2.3.4|2024-01-01 00:00:00|svc|42\ngarbage\n");
    let response = app.oneshot(batch_request("file", &archive)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let snapshot = ctx.state.metrics.snapshot();
    assert_eq!(snapshot.records_accepted, 1);
    assert_eq!(snapshot.records_skipped, 1);
}

#[tokio::test]
async fn test_batch_upload_without_file_field_is_rejected() {
    let ctx = test_context();
    let app = build_router(ctx.state, 10 * 1024 * 1024);

    let archive = zip_bytes("a|1.2.3.4|2024-01-01 00:00:00|svc|1\n");
    let response = app.oneshot(batch_request("other", &archive)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_string(response).await.contains("file"));
}

#[tokio::test]
async fn test_batch_upload_corrupt_archive_is_server_error() {
    let ctx = test_context();
    let app = build_router(ctx.state, 10 * 1024 * 1024);

    let response = app
        .oneshot(batch_request("file", b"this is not a zip"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_string(response)
        .await
        .starts_with("Failed to process batch logs:"));
}

// =============================================================================
// Metrics
// =============================================================================

#[tokio::test]
async fn test_metrics_track_request_outcomes() {
    let ctx = test_context();

    let app = build_router(Arc::clone(&ctx.state), 1024);
    let body = r#"{"id":"m","ip":"1.2.3.4","eventTime":"2024-01-01 12:00:00","name":"svc","randomNumber":1}"#;
    let response = app.oneshot(realtime_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let app = build_router(Arc::clone(&ctx.state), 1024);
    let response = app.oneshot(realtime_request("nope")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let snapshot = ctx.state.metrics.snapshot();
    assert_eq!(snapshot.requests_total, 2);
    assert_eq!(snapshot.requests_success, 1);
    assert_eq!(snapshot.requests_client_error, 1);
    assert_eq!(snapshot.records_accepted, 1);
}
