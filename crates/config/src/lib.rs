//! Loghive Configuration
//!
//! TOML-based configuration loading with sensible defaults.
//! A minimal config should just work - only specify what you need to change.
//!
//! # Parsing
//!
//! Use the `FromStr` trait to parse configuration:
//!
//! ```
//! use loghive_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str("[server]\nport = 8080").unwrap();
//! ```
//!
//! # Example Config
//!
//! ```toml
//! [server]
//! port = 8080
//!
//! [writer]
//! directory = "logs"
//! file_prefix = "client"
//!
//! [pipeline]
//! capacity = 65536
//! dispatch = "batched"
//! ```

mod error;
mod logging;
mod pipeline;
mod server;
mod writer;

use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

pub use error::{ConfigError, Result};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use pipeline::{DispatchPolicy, PipelineConfig};
pub use server::ServerConfig;
pub use writer::WriterConfig;

/// Main configuration structure
///
/// All sections are optional with sensible defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings
    pub server: ServerConfig,

    /// Rotating file writer settings
    pub writer: WriterConfig,

    /// Ingestion pipeline settings
    pub pipeline: PipelineConfig,

    /// Logging configuration
    pub log: LogConfig,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, contains invalid TOML, or
    /// fails validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string
    fn parse(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if self.pipeline.capacity < 2 || !self.pipeline.capacity.is_power_of_two() {
            return Err(ConfigError::invalid_value(
                "pipeline",
                "capacity",
                format!("{} is not a power of two >= 2", self.pipeline.capacity),
            ));
        }

        if self.pipeline.batch_threshold == 0 {
            return Err(ConfigError::invalid_value(
                "pipeline",
                "batch_threshold",
                "must be at least 1",
            ));
        }

        if self.pipeline.batch_interval_secs == 0 {
            return Err(ConfigError::invalid_value(
                "pipeline",
                "batch_interval_secs",
                "must be at least 1",
            ));
        }

        if self.writer.file_prefix.is_empty() {
            return Err(ConfigError::invalid_value(
                "writer",
                "file_prefix",
                "must not be empty",
            ));
        }

        if self.writer.directory.is_empty() {
            return Err(ConfigError::invalid_value(
                "writer",
                "directory",
                "must not be empty",
            ));
        }

        Ok(())
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
