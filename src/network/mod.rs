//! Network Module
//!
//! Client-side connection handling.
//!
//! ## Architecture
//! - [`Channel`]: blocking byte transport with exact-length reads
//! - [`Session`]: handshake, login and the command set on top of a channel
//! - One request in flight at a time; no background threads

mod channel;
mod session;

pub use channel::{Channel, StreamChannel, TcpChannel};
pub use session::{Session, SessionState};
