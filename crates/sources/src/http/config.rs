//! HTTP source configuration

/// Default listen port
const DEFAULT_PORT: u16 = 8080;

/// Default maximum upload size (10MB, matches the multipart limit)
const DEFAULT_MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// HTTP source configuration
#[derive(Debug, Clone)]
pub struct HttpSourceConfig {
    /// Bind address (e.g., "0.0.0.0")
    pub address: String,

    /// Listen port
    pub port: u16,

    /// Maximum request body size in bytes, enforced on both endpoints
    pub max_upload_size: usize,
}

impl Default for HttpSourceConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0".into(),
            port: DEFAULT_PORT,
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
        }
    }
}

impl HttpSourceConfig {
    /// Create config with custom port
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    /// Get the socket address to bind to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}
