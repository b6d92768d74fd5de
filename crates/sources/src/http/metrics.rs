//! HTTP source metrics
//!
//! Atomic counters for tracking HTTP ingestion activity.

use std::sync::atomic::{AtomicU64, Ordering};

/// HTTP source metrics
#[derive(Debug, Default)]
pub struct HttpSourceMetrics {
    /// Total HTTP requests received
    pub requests_total: AtomicU64,

    /// Successful requests (2xx)
    pub requests_success: AtomicU64,

    /// Client errors (4xx)
    pub requests_client_error: AtomicU64,

    /// Server errors (5xx)
    pub requests_server_error: AtomicU64,

    /// Records accepted into the buffer (realtime and bulk)
    pub records_accepted: AtomicU64,

    /// Archive lines skipped as malformed
    pub records_skipped: AtomicU64,

    /// Upload bytes received
    pub bytes_received: AtomicU64,
}

impl HttpSourceMetrics {
    /// Create new metrics instance
    pub const fn new() -> Self {
        Self {
            requests_total: AtomicU64::new(0),
            requests_success: AtomicU64::new(0),
            requests_client_error: AtomicU64::new(0),
            requests_server_error: AtomicU64::new(0),
            records_accepted: AtomicU64::new(0),
            records_skipped: AtomicU64::new(0),
            bytes_received: AtomicU64::new(0),
        }
    }

    /// Record a request received
    #[inline]
    pub fn request_received(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful request
    #[inline]
    pub fn request_success(&self) {
        self.requests_success.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a client error (4xx)
    #[inline]
    pub fn request_client_error(&self) {
        self.requests_client_error.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a server error (5xx)
    #[inline]
    pub fn request_server_error(&self) {
        self.requests_server_error.fetch_add(1, Ordering::Relaxed);
    }

    /// Record records accepted and skipped
    #[inline]
    pub fn records_processed(&self, accepted: u64, skipped: u64) {
        self.records_accepted.fetch_add(accepted, Ordering::Relaxed);
        self.records_skipped.fetch_add(skipped, Ordering::Relaxed);
    }

    /// Record bytes received
    #[inline]
    pub fn bytes_received(&self, bytes: u64) {
        self.bytes_received.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Get a consistent point-in-time snapshot
    pub fn snapshot(&self) -> HttpMetricsSnapshot {
        HttpMetricsSnapshot {
            requests_total: self.requests_total.load(Ordering::Relaxed),
            requests_success: self.requests_success.load(Ordering::Relaxed),
            requests_client_error: self.requests_client_error.load(Ordering::Relaxed),
            requests_server_error: self.requests_server_error.load(Ordering::Relaxed),
            records_accepted: self.records_accepted.load(Ordering::Relaxed),
            records_skipped: self.records_skipped.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
        }
    }
}

/// Metrics snapshot
#[derive(Debug, Clone, Copy)]
pub struct HttpMetricsSnapshot {
    pub requests_total: u64,
    pub requests_success: u64,
    pub requests_client_error: u64,
    pub requests_server_error: u64,
    pub records_accepted: u64,
    pub records_skipped: u64,
    pub bytes_received: u64,
}
