//! # qapwire
//!
//! Client for the QAP1 request/response protocol spoken by remote statistical
//! computation servers:
//! - Greeting validation and authentication negotiation
//! - 16-byte command/response packet framing
//! - Recursive codec for the tagged binary expression format (SEXP)
//! - Derived views over decoded trees (lists, factors, tri-state bools, matrices)
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Session                               │
//! │        (handshake, login, eval/assign, file commands)        │
//! └──────────────┬──────────────────────────────┬───────────────┘
//!                │ RequestPacket                │ ResponsePacket
//!                ▼                              ▲
//!   ┌────────────────────────┐     ┌────────────┴───────────┐
//!   │  Parameter encoder     │     │   SEXP decoder         │
//!   │  (DT blocks, SEXP enc) │     │   (Expression tree)    │
//!   └────────────┬───────────┘     └────────────▲───────────┘
//!                │                              │
//!                ▼                              │
//!   ┌─────────────────────────────────────────────────────────┐
//!   │                  Channel (TCP stream)                    │
//!   │            send_all / receive_exact / counters           │
//!   └─────────────────────────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod sexp;
pub mod auth;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{QapError, Result};
pub use config::Config;
pub use network::{Session, SessionState};
pub use sexp::{Expression, Factor, RBool, RList, Value, XpType};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of qapwire
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
