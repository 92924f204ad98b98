//! Handshake Tests
//!
//! Tests for greeting validation and capability scanning.

use qapwire::auth::AuthMethod;
use qapwire::protocol::{Greeting, GREETING_SIZE};
use qapwire::QapError;

/// "Rsrv0102QAP1" + reserved + capability area filled with `-`
fn greeting() -> Vec<u8> {
    let mut bytes = b"Rsrv0102QAP1".to_vec();
    bytes.extend_from_slice(b"\r\n\r\n");
    bytes.resize(GREETING_SIZE, b'-');
    bytes
}

fn with_token(mut bytes: Vec<u8>, offset: usize, token: &[u8]) -> Vec<u8> {
    bytes[offset..offset + token.len()].copy_from_slice(token);
    bytes
}

fn handshake_message(err: QapError) -> String {
    match err {
        QapError::Handshake(message) => message,
        other => panic!("Expected handshake error, got {:?}", other),
    }
}

// =============================================================================
// Validation Tests
// =============================================================================

#[test]
fn test_plain_greeting_without_auth() {
    let parsed = Greeting::parse(&greeting()).unwrap();
    assert_eq!(parsed.version, 102);
    assert_eq!(parsed.auth, None);
    assert!(!parsed.auth_required());
}

#[test]
fn test_bad_magic() {
    let bytes = with_token(greeting(), 0, b"Xsrv");
    let err = Greeting::parse(&bytes).unwrap_err();
    assert_eq!(handshake_message(err), "Invalid IDstring");
}

#[test]
fn test_bad_transport() {
    let bytes = with_token(greeting(), 8, b"QAP2");
    let err = Greeting::parse(&bytes).unwrap_err();
    assert_eq!(handshake_message(err), "Protocol not supported");
}

#[test]
fn test_bad_version_digits() {
    let bytes = with_token(greeting(), 4, b"01x2");
    let err = Greeting::parse(&bytes).unwrap_err();
    assert!(matches!(err, QapError::Handshake(_)));
}

#[test]
fn test_short_greeting() {
    let bytes = greeting();
    let err = Greeting::parse(&bytes[..20]).unwrap_err();
    assert!(matches!(err, QapError::Handshake(_)));
}

// =============================================================================
// Capability Tests
// =============================================================================

#[test]
fn test_crypt_token_captures_salt() {
    let bytes = with_token(greeting(), 16, b"ARuc");
    let bytes = with_token(bytes, 20, b"\nab1");

    let parsed = Greeting::parse(&bytes).unwrap();
    assert!(parsed.auth_required());
    assert_eq!(
        parsed.auth,
        Some(AuthMethod::Crypt {
            salt: "ab1".to_string()
        })
    );
    assert_eq!(parsed.auth.unwrap().salt(), Some("ab1"));
}

#[test]
fn test_plain_token() {
    let bytes = with_token(greeting(), 24, b"ARpt");
    let parsed = Greeting::parse(&bytes).unwrap();
    assert_eq!(parsed.auth, Some(AuthMethod::Plain));
}

#[test]
fn test_crypt_takes_priority_over_plain() {
    // Plain first, crypt later
    let bytes = with_token(greeting(), 16, b"ARpt");
    let bytes = with_token(bytes, 20, b"ARuc");
    let bytes = with_token(bytes, 24, b"\nxyz");
    let parsed = Greeting::parse(&bytes).unwrap();
    assert_eq!(parsed.auth.as_ref().and_then(AuthMethod::salt), Some("xyz"));

    // Crypt first, plain later
    let bytes = with_token(greeting(), 16, b"ARuc");
    let bytes = with_token(bytes, 20, b"\nxyz");
    let bytes = with_token(bytes, 24, b"ARpt");
    let parsed = Greeting::parse(&bytes).unwrap();
    assert_eq!(parsed.auth.as_ref().and_then(AuthMethod::salt), Some("xyz"));
}

#[test]
fn test_crypt_token_without_room_for_salt() {
    let bytes = with_token(greeting(), 28, b"ARuc");
    let err = Greeting::parse(&bytes).unwrap_err();
    assert!(matches!(err, QapError::Handshake(_)));
}
