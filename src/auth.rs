//! Authentication
//!
//! The greeting tells the client whether it must log in and how the password
//! travels: as plain text, or hashed with the traditional DES-based Unix
//! `crypt` using a salt chosen by the server. The hash itself is supplied by
//! the caller through [`PasswordHasher`].

use crate::error::{QapError, Result};

/// Login mechanism advertised in the greeting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMethod {
    /// Password sent as-is
    Plain,
    /// Password sent as `crypt(password, salt)`
    Crypt { salt: String },
}

impl AuthMethod {
    /// Salt captured from the greeting, crypt only
    pub fn salt(&self) -> Option<&str> {
        match self {
            AuthMethod::Crypt { salt } => Some(salt),
            AuthMethod::Plain => None,
        }
    }
}

/// Traditional Unix password hash.
///
/// Implementations receive the salt exactly as the server sent it (3
/// characters); DES-based crypt only reads the first two and returns a
/// 13-character digest.
pub trait PasswordHasher: Send {
    fn hash(&self, password: &str, salt: &str) -> Result<String>;
}

impl<F> PasswordHasher for F
where
    F: Fn(&str, &str) -> Result<String> + Send,
{
    fn hash(&self, password: &str, salt: &str) -> Result<String> {
        self(password, salt)
    }
}

/// Build the login message body: `user\npassword` or `user\ncrypt(password)`
pub fn login_message(
    user: &str,
    password: &str,
    method: &AuthMethod,
    hasher: Option<&dyn PasswordHasher>,
) -> Result<String> {
    let secret = match method {
        AuthMethod::Plain => password.to_string(),
        AuthMethod::Crypt { salt } => {
            let hasher = hasher.ok_or_else(|| {
                QapError::Auth(
                    "server requires crypt login but no password hasher is set".to_string(),
                )
            })?;
            hasher.hash(password, salt)?
        }
    };

    Ok(format!("{}\n{}", user, secret))
}
