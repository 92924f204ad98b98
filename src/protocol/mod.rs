//! Protocol Module
//!
//! Defines the QAP1 wire protocol for client-server communication.
//! All multi-byte integers are little-endian.
//!
//! ## Greeting (server → client, once, 32 bytes)
//! ```text
//! ┌──────────┬──────────┬──────────┬──────────┬───────────────────────────┐
//! │ "Rsrv"   │ "0102"   │ "QAP1"   │ reserved │ 4 × 4-byte capabilities    │
//! │ 0..4     │ 4..8     │ 8..12    │ 12..16   │ 16..32 ("ARuc", "ARpt")    │
//! └──────────┴──────────┴──────────┴──────────┴───────────────────────────┘
//! ```
//!
//! ### Packet Header (both directions, 16 bytes)
//! ```text
//! ┌──────────┬──────────┬──────────┬──────────┐
//! │ Code (4) │ Len (4)  │ Off (4)  │ Res (4)  │
//! └──────────┴──────────┴──────────┴──────────┘
//! ```
//! Requests carry a command code. Responses carry a status byte
//! (1 = OK, 2 = ERR) in byte 0 and the error code in byte 3.
//!
//! ### Parameter Block
//! ```text
//! ┌─────────┬───────────────┬──────────────────────────────┐
//! │ DT (1)  │ Len (3 or 4)  │ Data, zero-padded to 4 bytes │
//! └─────────┴───────────────┴──────────────────────────────┘
//! ```
//! With the LARGE flag the header grows to 8 bytes and the length is 4 bytes wide.

mod command;
mod header;
mod param;
mod packet;
mod status;
mod handshake;

pub use command::CommandType;
pub use header::{PacketHeader, HEADER_SIZE};
pub use param::{
    header_size_for, length_header, parse_header, DataType, Parameter, LARGE_LENGTH_THRESHOLD,
    PARAM_HEADER_SIZE, PARAM_LARGE_HEADER_SIZE,
};
pub(crate) use param::align4;
pub use packet::{
    decode_response, read_response, write_request, RequestPacket, ResponsePacket, ResponseStatus,
};
pub use status::ErrorCode;
pub use handshake::{Greeting, GREETING_SIZE, MAGIC, TRANSPORT};
