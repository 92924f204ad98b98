//! Packet header
//!
//! The fixed 16-byte envelope shared by requests and responses.

use crate::error::{QapError, Result};

use super::CommandType;

/// Header size: four little-endian u32 fields
pub const HEADER_SIZE: usize = 16;

/// Decoded packet header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    /// Command code (requests) or status word (responses)
    pub code: u32,
    /// Payload length in bytes, not counting this header
    pub length: u32,
    /// Data offset behind the header, always 0 for requests from this client
    pub offset: u32,
    /// Reserved, always 0
    pub reserved: u32,
}

impl PacketHeader {
    /// Create a request header for `command` with `length` payload bytes
    pub fn request(command: CommandType, length: u32) -> Self {
        Self {
            code: command.code(),
            length,
            offset: 0,
            reserved: 0,
        }
    }

    /// Encode header to bytes (little-endian)
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..4].copy_from_slice(&self.code.to_le_bytes());
        buf[4..8].copy_from_slice(&self.length.to_le_bytes());
        buf[8..12].copy_from_slice(&self.offset.to_le_bytes());
        buf[12..16].copy_from_slice(&self.reserved.to_le_bytes());
        buf
    }

    /// Decode header from bytes (little-endian)
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(QapError::UnexpectedResponse(format!(
                "Incomplete header: expected {} bytes, got {}",
                HEADER_SIZE,
                bytes.len()
            )));
        }

        let field = |at: usize| {
            u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
        };

        Ok(Self {
            code: field(0),
            length: field(4),
            offset: field(8),
            reserved: field(12),
        })
    }

    /// Status byte of a response header (byte 0 of the code word)
    pub fn status_byte(&self) -> u8 {
        (self.code & 0xFF) as u8
    }

    /// Error code of an ERR response header (byte 3 of the code word)
    pub fn error_byte(&self) -> u8 {
        (self.code >> 24) as u8
    }
}
