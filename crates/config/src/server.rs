//! HTTP server configuration

use serde::Deserialize;

/// HTTP server settings
///
/// # Example
///
/// ```toml
/// [server]
/// address = "0.0.0.0"
/// port = 8080
/// max_upload_size = 10485760
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    /// Default: "0.0.0.0"
    pub address: String,

    /// Listen port
    /// Default: 8080
    pub port: u16,

    /// Maximum request body size in bytes
    /// Default: 10485760 (10MB)
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0".into(),
            port: 8080,
            max_upload_size: 10 * 1024 * 1024,
        }
    }
}
