//! Server greeting
//!
//! The 32 bytes the server sends right after the TCP connection opens.
//! They identify the server, the protocol version and the transport, and
//! advertise which login mechanism (if any) the server requires.

use crate::auth::AuthMethod;
use crate::error::{QapError, Result};

/// Size of the greeting in bytes
pub const GREETING_SIZE: usize = 32;

/// Expected server identifier at bytes 0..4
pub const MAGIC: &[u8; 4] = b"Rsrv";

/// Expected transport identifier at bytes 8..12
pub const TRANSPORT: &[u8; 4] = b"QAP1";

/// Capability token: login required, crypt-hashed password
const TOKEN_CRYPT: &[u8; 4] = b"ARuc";

/// Capability token: login required, plain-text password
const TOKEN_PLAIN: &[u8; 4] = b"ARpt";

/// Offset of the first capability token
const CAPABILITIES_OFFSET: usize = 16;

/// Parsed server greeting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Greeting {
    /// Protocol version, e.g. 102 for "0102"
    pub version: u32,
    /// Login mechanism, `None` when the server does not require login
    pub auth: Option<AuthMethod>,
}

impl Greeting {
    /// Parse and validate the 32-byte greeting
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < GREETING_SIZE {
            return Err(QapError::Handshake(format!(
                "Handshake failed: expected {} bytes, got {}",
                GREETING_SIZE,
                bytes.len()
            )));
        }

        if &bytes[0..4] != MAGIC {
            return Err(QapError::Handshake("Invalid IDstring".to_string()));
        }

        if &bytes[8..12] != TRANSPORT {
            return Err(QapError::Handshake("Protocol not supported".to_string()));
        }

        let version = parse_version(&bytes[4..8])?;
        let auth = scan_capabilities(&bytes[..GREETING_SIZE])?;

        Ok(Self { version, auth })
    }

    /// Whether the first command must be a login
    pub fn auth_required(&self) -> bool {
        self.auth.is_some()
    }
}

fn parse_version(digits: &[u8]) -> Result<u32> {
    std::str::from_utf8(digits)
        .ok()
        .and_then(|text| text.trim().parse::<u32>().ok())
        .ok_or_else(|| {
            QapError::Handshake(format!("Invalid protocol version: {:?}", digits))
        })
}

/// Walk the four capability tokens; crypt wins over plain when both appear.
///
/// A crypt token is followed by one separator byte and a 3-byte salt, so it
/// needs 8 bytes of room inside the greeting.
fn scan_capabilities(greeting: &[u8]) -> Result<Option<AuthMethod>> {
    let mut auth = None;

    for pos in (CAPABILITIES_OFFSET..GREETING_SIZE).step_by(4) {
        let token = &greeting[pos..pos + 4];

        if token == TOKEN_CRYPT {
            let salt = greeting.get(pos + 5..pos + 8).ok_or_else(|| {
                QapError::Handshake(format!("Malformed capability token at offset {}", pos))
            })?;
            auth = Some(AuthMethod::Crypt {
                salt: String::from_utf8_lossy(salt).into_owned(),
            });
        } else if token == TOKEN_PLAIN && auth.is_none() {
            auth = Some(AuthMethod::Plain);
        }
    }

    Ok(auth)
}
