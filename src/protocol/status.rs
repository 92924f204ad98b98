//! Server error codes
//!
//! Carried in byte 3 of an ERR response header.

use std::fmt;

/// Error code reported by the server with an ERR status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    AuthFailed,
    ConnectionBroken,
    InvalidCommand,
    InvalidParameter,
    EvalError,
    IoError,
    FileNotOpen,
    AccessDenied,
    UnsupportedCommand,
    UnknownCommand,
    DataOverflow,
    ObjectTooBig,
    OutOfMemory,
    SessionBusy,
    DetachFailed,
    /// Code outside the known table
    Other(u8),
}

impl ErrorCode {
    pub fn from_code(code: u8) -> Self {
        match code {
            65 => ErrorCode::AuthFailed,
            66 => ErrorCode::ConnectionBroken,
            67 => ErrorCode::InvalidCommand,
            68 => ErrorCode::InvalidParameter,
            69 => ErrorCode::EvalError,
            70 => ErrorCode::IoError,
            71 => ErrorCode::FileNotOpen,
            72 => ErrorCode::AccessDenied,
            73 => ErrorCode::UnsupportedCommand,
            74 => ErrorCode::UnknownCommand,
            75 => ErrorCode::DataOverflow,
            76 => ErrorCode::ObjectTooBig,
            77 => ErrorCode::OutOfMemory,
            80 => ErrorCode::SessionBusy,
            81 => ErrorCode::DetachFailed,
            other => ErrorCode::Other(other),
        }
    }

    pub fn code(self) -> u8 {
        match self {
            ErrorCode::AuthFailed => 65,
            ErrorCode::ConnectionBroken => 66,
            ErrorCode::InvalidCommand => 67,
            ErrorCode::InvalidParameter => 68,
            ErrorCode::EvalError => 69,
            ErrorCode::IoError => 70,
            ErrorCode::FileNotOpen => 71,
            ErrorCode::AccessDenied => 72,
            ErrorCode::UnsupportedCommand => 73,
            ErrorCode::UnknownCommand => 74,
            ErrorCode::DataOverflow => 75,
            ErrorCode::ObjectTooBig => 76,
            ErrorCode::OutOfMemory => 77,
            ErrorCode::SessionBusy => 80,
            ErrorCode::DetachFailed => 81,
            ErrorCode::Other(code) => code,
        }
    }

    /// Fixed human-readable text for the code
    pub fn message(self) -> &'static str {
        match self {
            ErrorCode::AuthFailed => "Authentication failure",
            ErrorCode::ConnectionBroken => "Connection closed or broken packet killed it",
            ErrorCode::InvalidCommand => "Unsupported/invalid command",
            ErrorCode::InvalidParameter => "Some parameters are invalid",
            ErrorCode::EvalError => "R-error occured, usually followed by connection shutdown",
            ErrorCode::IoError => "I/O error",
            ErrorCode::FileNotOpen => "attempt to perform fileRead/Write on closed file",
            ErrorCode::AccessDenied => {
                "the server doesn't allow the user to issue the specified command"
            }
            ErrorCode::UnsupportedCommand => "unsupported command",
            ErrorCode::UnknownCommand => "unknown command",
            ErrorCode::DataOverflow => "incoming packet is too big",
            ErrorCode::ObjectTooBig => {
                "the requested object is too big to be transported in that way"
            }
            ErrorCode::OutOfMemory => "out of memory",
            ErrorCode::SessionBusy => "session is still busy",
            ErrorCode::DetachFailed => "unable to detach session",
            ErrorCode::Other(_) => "unknown server error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message(), self.code())
    }
}
