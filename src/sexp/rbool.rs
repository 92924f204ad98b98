//! Tri-state logical value

use std::fmt;

/// Logical value that can also be "not available"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RBool {
    False = 0,
    True = 1,
    NotAvailable = 2,
}

impl RBool {
    /// Map a wire byte to a value. Codes other than 0 and 1 are NA.
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => RBool::False,
            1 => RBool::True,
            _ => RBool::NotAvailable,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn is_true(self) -> bool {
        self == RBool::True
    }

    pub fn is_false(self) -> bool {
        self == RBool::False
    }

    pub fn is_na(self) -> bool {
        self == RBool::NotAvailable
    }

    /// `Some(bool)` for TRUE/FALSE, `None` for NA
    pub fn to_bool(self) -> Option<bool> {
        match self {
            RBool::True => Some(true),
            RBool::False => Some(false),
            RBool::NotAvailable => None,
        }
    }
}

impl From<bool> for RBool {
    fn from(value: bool) -> Self {
        if value {
            RBool::True
        } else {
            RBool::False
        }
    }
}

impl fmt::Display for RBool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RBool::True => "TRUE",
            RBool::False => "FALSE",
            RBool::NotAvailable => "NA",
        })
    }
}
