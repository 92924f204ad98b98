//! Error types for qapwire
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

use crate::protocol::ErrorCode;
use crate::sexp::XpType;

/// Result type alias using QapError
pub type Result<T> = std::result::Result<T, QapError>;

/// Unified error type for qapwire operations
#[derive(Debug, Error)]
pub enum QapError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Connection Errors
    // -------------------------------------------------------------------------
    /// Socket refused, closed, or the stream ended before a full read
    #[error("Connection error: {0}")]
    Connection(String),

    /// Greeting rejected; the connection must be abandoned
    #[error("Handshake error: {0}")]
    Handshake(String),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    /// Server answered with ERR status
    #[error("Protocol error {}: {}", .0.code(), .0.message())]
    Protocol(ErrorCode),

    /// Value does not fit the 4-byte length field of the large header form
    #[error("Payload too large for transport: {0} bytes")]
    TooLarge(usize),

    /// Response frame that does not match what the command expects
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    // -------------------------------------------------------------------------
    // Codec Errors
    // -------------------------------------------------------------------------
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Unsupported encoding for expression type {0}")]
    UnsupportedEncoding(XpType),

    // -------------------------------------------------------------------------
    // Authentication Errors
    // -------------------------------------------------------------------------
    #[error("Authentication error: {0}")]
    Auth(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl QapError {
    /// Server error code, if this error came from an ERR response
    pub fn server_code(&self) -> Option<ErrorCode> {
        match self {
            QapError::Protocol(code) => Some(*code),
            _ => None,
        }
    }
}
