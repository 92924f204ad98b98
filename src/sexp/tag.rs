//! Expression type tags (XT tags)

use std::fmt;

// Wire codes. The low six bits of a node's first byte carry one of these.
pub const XT_NULL: u8 = 0;
pub const XT_INT: u8 = 1;
pub const XT_DOUBLE: u8 = 2;
pub const XT_STR: u8 = 3;
pub const XT_LANG: u8 = 4;
pub const XT_SYM: u8 = 5;
pub const XT_BOOL: u8 = 6;
pub const XT_VECTOR: u8 = 16;
pub const XT_LIST: u8 = 17;
pub const XT_CLOS: u8 = 18;
pub const XT_ARRAY_INT: u8 = 32;
pub const XT_ARRAY_DOUBLE: u8 = 33;
pub const XT_ARRAY_STR: u8 = 34;
/// Older unaligned bool array layout, decoded as [`XpType::ArrayBool`]
pub const XT_ARRAY_BOOL_UA: u8 = 35;
pub const XT_ARRAY_BOOL: u8 = 36;
pub const XT_UNKNOWN: u8 = 48;
/// Never on the wire; assigned when an int array is rebuilt as a factor
pub const XT_FACTOR: u8 = 127;

/// Flag: length field is 4 bytes wide and the header 8 bytes long
pub const XT_LARGE: u8 = 0x40;
/// Flag: an attribute expression precedes the payload
pub const XT_HAS_ATTR: u8 = 0x80;
/// Mask selecting the type code from the first header byte
pub const XT_TYPE_MASK: u8 = 0x3F;

/// Type of an expression node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XpType {
    Null,
    Int,
    Double,
    Str,
    Lang,
    Symbol,
    Bool,
    Vector,
    List,
    Closure,
    ArrayInt,
    ArrayDouble,
    ArrayStr,
    ArrayBool,
    Unknown,
    Factor,
    /// Wire code this client does not interpret
    Unrecognized(u8),
}

impl XpType {
    /// Map a wire code (flags stripped) to a type
    pub fn from_code(code: u8) -> Self {
        match code {
            XT_NULL => XpType::Null,
            XT_INT => XpType::Int,
            XT_DOUBLE => XpType::Double,
            XT_STR => XpType::Str,
            XT_LANG => XpType::Lang,
            XT_SYM => XpType::Symbol,
            XT_BOOL => XpType::Bool,
            XT_VECTOR => XpType::Vector,
            XT_LIST => XpType::List,
            XT_CLOS => XpType::Closure,
            XT_ARRAY_INT => XpType::ArrayInt,
            XT_ARRAY_DOUBLE => XpType::ArrayDouble,
            XT_ARRAY_STR => XpType::ArrayStr,
            XT_ARRAY_BOOL | XT_ARRAY_BOOL_UA => XpType::ArrayBool,
            XT_UNKNOWN => XpType::Unknown,
            XT_FACTOR => XpType::Factor,
            other => XpType::Unrecognized(other),
        }
    }

    /// Wire code for this type
    pub fn code(self) -> u8 {
        match self {
            XpType::Null => XT_NULL,
            XpType::Int => XT_INT,
            XpType::Double => XT_DOUBLE,
            XpType::Str => XT_STR,
            XpType::Lang => XT_LANG,
            XpType::Symbol => XT_SYM,
            XpType::Bool => XT_BOOL,
            XpType::Vector => XT_VECTOR,
            XpType::List => XT_LIST,
            XpType::Closure => XT_CLOS,
            XpType::ArrayInt => XT_ARRAY_INT,
            XpType::ArrayDouble => XT_ARRAY_DOUBLE,
            XpType::ArrayStr => XT_ARRAY_STR,
            XpType::ArrayBool => XT_ARRAY_BOOL,
            XpType::Unknown => XT_UNKNOWN,
            XpType::Factor => XT_FACTOR,
            XpType::Unrecognized(code) => code,
        }
    }
}

impl fmt::Display for XpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            XpType::Null => "NULL",
            XpType::Int => "INT",
            XpType::Double => "DOUBLE",
            XpType::Str => "STRING",
            XpType::Lang => "LANG",
            XpType::Symbol => "SYMBOL",
            XpType::Bool => "BOOL",
            XpType::Vector => "VECTOR",
            XpType::List => "LIST",
            XpType::Closure => "CLOSURE",
            XpType::ArrayInt => "ARRAY_INT",
            XpType::ArrayDouble => "ARRAY_DOUBLE",
            XpType::ArrayStr => "ARRAY_STRING",
            XpType::ArrayBool => "ARRAY_BOOL",
            XpType::Unknown => "UNKNOWN",
            XpType::Factor => "FACTOR",
            XpType::Unrecognized(code) => return write!(f, "UNRECOGNIZED({})", code),
        };
        f.write_str(name)
    }
}
