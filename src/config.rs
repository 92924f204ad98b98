//! Configuration for qapwire
//!
//! Centralized connection configuration with sensible defaults.

use std::time::Duration;

use crate::error::{QapError, Result};

/// Default server port
pub const DEFAULT_PORT: u16 = 6311;

/// Default max bytes carried by one `writeFile` packet in chunked uploads
pub const DEFAULT_FILE_CHUNK_SIZE: usize = 128;

/// Main configuration for a qapwire session
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// Server host name or IP address
    pub host: String,

    /// Server TCP port
    pub port: u16,

    /// Connect timeout (milliseconds, 0 = OS default)
    pub connect_timeout_ms: u64,

    /// Socket read timeout (milliseconds, 0 = block forever)
    pub read_timeout_ms: u64,

    /// Socket write timeout (milliseconds, 0 = block forever)
    pub write_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // File Transfer Configuration
    // -------------------------------------------------------------------------
    /// Max payload bytes per `writeFile` packet when uploading from a reader.
    /// The 16-byte packet header and parameter header come on top of this.
    pub file_chunk_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            connect_timeout_ms: 5000,
            read_timeout_ms: 0,
            write_timeout_ms: 0,
            file_chunk_size: DEFAULT_FILE_CHUNK_SIZE,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// `host:port` form used for address resolution
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check values that would make a session unusable
    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(QapError::Config("host must not be empty".to_string()));
        }
        if self.file_chunk_size == 0 {
            return Err(QapError::Config(
                "file_chunk_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn connect_timeout(&self) -> Option<Duration> {
        millis(self.connect_timeout_ms)
    }

    pub(crate) fn read_timeout(&self) -> Option<Duration> {
        millis(self.read_timeout_ms)
    }

    pub(crate) fn write_timeout(&self) -> Option<Duration> {
        millis(self.write_timeout_ms)
    }
}

fn millis(ms: u64) -> Option<Duration> {
    if ms > 0 {
        Some(Duration::from_millis(ms))
    } else {
        None
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the server host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the server port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the connect timeout (in milliseconds)
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = ms;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the chunk size used by chunked file uploads (in bytes)
    pub fn file_chunk_size(mut self, size: usize) -> Self {
        self.config.file_chunk_size = size;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
