//! Request and response packets
//!
//! ## Request
//! ```text
//! ┌──────────────────┬─────────────┬─────────────┬─────┐
//! │ Header (16)      │ Parameter 1 │ Parameter 2 │ ... │
//! │ len = Σ params   │             │             │     │
//! └──────────────────┴─────────────┴─────────────┴─────┘
//! ```
//!
//! ## Response
//! ```text
//! ┌──────────────────┬──────────────────────────────┐
//! │ Header (16)      │ Content (len bytes)          │
//! │ status, len      │                              │
//! └──────────────────┴──────────────────────────────┘
//! ```

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{QapError, Result};
use crate::network::Channel;

use super::{CommandType, ErrorCode, PacketHeader, Parameter, HEADER_SIZE};

/// Response status byte: OK
const STATUS_OK: u8 = 1;

/// Response status byte: ERR
const STATUS_ERR: u8 = 2;

// =============================================================================
// Request
// =============================================================================

/// An outgoing command with its parameters in call order
#[derive(Debug, Clone)]
pub struct RequestPacket {
    command: CommandType,
    params: Vec<Parameter>,
}

impl RequestPacket {
    /// Create a request with no parameters
    pub fn new(command: CommandType) -> Self {
        Self {
            command,
            params: Vec::new(),
        }
    }

    /// Append a parameter
    pub fn param(mut self, param: Parameter) -> Self {
        self.params.push(param);
        self
    }

    pub fn command(&self) -> CommandType {
        self.command
    }

    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    /// Payload length: the sum of all parameter blocks
    pub fn payload_len(&self) -> usize {
        self.params.iter().map(Parameter::len).sum()
    }

    /// Encode header and parameters into one frame
    pub fn encode(&self) -> Result<Bytes> {
        let payload_len = self.payload_len();
        let length = u32::try_from(payload_len).map_err(|_| QapError::TooLarge(payload_len))?;

        let mut frame = BytesMut::with_capacity(HEADER_SIZE + payload_len);
        frame.put_slice(&PacketHeader::request(self.command, length).encode());
        for param in &self.params {
            frame.put_slice(param.as_bytes());
        }

        Ok(frame.freeze())
    }
}

// =============================================================================
// Response
// =============================================================================

/// Decoded response status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    Ok,
    Error(ErrorCode),
}

impl ResponseStatus {
    fn from_header(header: &PacketHeader) -> Result<Self> {
        match header.status_byte() {
            STATUS_OK => Ok(ResponseStatus::Ok),
            STATUS_ERR => Ok(ResponseStatus::Error(ErrorCode::from_code(header.error_byte()))),
            other => Err(QapError::UnexpectedResponse(format!(
                "Unknown response status: 0x{:02x}",
                other
            ))),
        }
    }
}

/// A response frame: status plus raw content
#[derive(Debug, Clone)]
pub struct ResponsePacket {
    header: PacketHeader,
    status: ResponseStatus,
    content: Bytes,
}

impl ResponsePacket {
    /// Build a response from a parsed header and its fully received content
    pub fn new(header: PacketHeader, content: Bytes) -> Result<Self> {
        let status = ResponseStatus::from_header(&header)?;
        Ok(Self {
            header,
            status,
            content,
        })
    }

    pub fn header(&self) -> &PacketHeader {
        &self.header
    }

    pub fn status(&self) -> ResponseStatus {
        self.status
    }

    pub fn is_ok(&self) -> bool {
        self.status == ResponseStatus::Ok
    }

    /// Raw content bytes (empty when the server sent none)
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Content of an OK response, or the server error as `QapError::Protocol`
    pub fn into_content(self) -> Result<Bytes> {
        match self.status {
            ResponseStatus::Ok => Ok(self.content),
            ResponseStatus::Error(code) => Err(QapError::Protocol(code)),
        }
    }
}

/// Decode a complete response frame from bytes
pub fn decode_response(bytes: &[u8]) -> Result<ResponsePacket> {
    let header = PacketHeader::decode(bytes)?;

    let total_len = HEADER_SIZE + header.length as usize;
    if bytes.len() < total_len {
        return Err(QapError::UnexpectedResponse(format!(
            "Incomplete response payload: expected {} bytes, got {}",
            total_len,
            bytes.len()
        )));
    }

    ResponsePacket::new(header, Bytes::copy_from_slice(&bytes[HEADER_SIZE..total_len]))
}

// =============================================================================
// Channel-based I/O helpers
// =============================================================================

/// Send a request over a channel
pub fn write_request<C: Channel + ?Sized>(
    channel: &mut C,
    request: &RequestPacket,
) -> Result<usize> {
    let frame = request.encode()?;
    tracing::trace!(
        "Sending {:?} with {} parameter(s), {} payload bytes",
        request.command(),
        request.params().len(),
        frame.len() - HEADER_SIZE
    );
    channel.send_all(&frame)
}

/// Read a complete response from a channel
///
/// Blocks until the header and all declared content bytes have arrived. The
/// content of an ERR response is drained too so the next response starts at
/// a header boundary.
pub fn read_response<C: Channel + ?Sized>(channel: &mut C) -> Result<ResponsePacket> {
    let header_bytes = channel.receive_exact(HEADER_SIZE)?;
    let header = PacketHeader::decode(&header_bytes)?;

    let content = if header.length > 0 {
        Bytes::from(channel.receive_exact(header.length as usize)?)
    } else {
        Bytes::new()
    };

    tracing::trace!(
        "Received response status=0x{:02x} content={} bytes",
        header.status_byte(),
        content.len()
    );

    ResponsePacket::new(header, content)
}
