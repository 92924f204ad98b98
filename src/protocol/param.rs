//! Parameter blocks
//!
//! One typed command argument on the wire: a type tag, a 3-byte (or large
//! 4-byte) length and the value bytes zero-padded to a multiple of 4.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{QapError, Result};
use crate::sexp::{self, Expression};

/// Lengths at or above this use the large header form
pub const LARGE_LENGTH_THRESHOLD: usize = 0xFF_FFF0;

/// Size of the short parameter/node header
pub const PARAM_HEADER_SIZE: usize = 4;

/// Size of the large parameter/node header
pub const PARAM_LARGE_HEADER_SIZE: usize = 8;

/// Large-form flag; parameter and expression tags share this bit
const LARGE_FLAG: u8 = 0x40;

/// Transport data types (DT tags)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DataType {
    Int = 1,
    Char = 2,
    Double = 3,
    /// NUL-terminated string
    String = 4,
    /// Raw bytes, may contain NUL
    Bytestream = 5,
    /// Encoded expression
    Sexp = 10,
    Array = 11,
}

impl DataType {
    /// Map a tag byte (large flag ignored) to a data type
    pub fn from_code(code: u8) -> Option<Self> {
        let data_type = match code & !LARGE_FLAG {
            1 => DataType::Int,
            2 => DataType::Char,
            3 => DataType::Double,
            4 => DataType::String,
            5 => DataType::Bytestream,
            10 => DataType::Sexp,
            11 => DataType::Array,
            _ => return None,
        };
        Some(data_type)
    }
}

/// Write a type tag and length field.
///
/// Short form is `tag, len[3]`; from [`LARGE_LENGTH_THRESHOLD`] on it is
/// `tag | 0x40, len[4], 0, 0, 0`.
pub fn length_header(buf: &mut BytesMut, tag: u8, len: usize) -> Result<()> {
    if len < LARGE_LENGTH_THRESHOLD {
        buf.put_u8(tag);
        buf.put_uint_le(len as u64, 3);
    } else {
        let wide = u32::try_from(len).map_err(|_| QapError::TooLarge(len))?;
        buf.put_u8(tag | LARGE_FLAG);
        buf.put_u32_le(wide);
        buf.put_bytes(0, 3);
    }
    Ok(())
}

/// Header size that [`length_header`] emits for `len`
pub fn header_size_for(len: usize) -> usize {
    if len < LARGE_LENGTH_THRESHOLD {
        PARAM_HEADER_SIZE
    } else {
        PARAM_LARGE_HEADER_SIZE
    }
}

/// Read a parameter header.
///
/// Returns the tag with the large flag stripped, the declared length and the
/// header size (4 or 8).
pub fn parse_header(bytes: &[u8]) -> Result<(u8, usize, usize)> {
    if bytes.len() < PARAM_HEADER_SIZE {
        return Err(QapError::Decode(format!(
            "Incomplete parameter header: expected {} bytes, got {}",
            PARAM_HEADER_SIZE,
            bytes.len()
        )));
    }

    let tag = bytes[0];
    if tag & LARGE_FLAG != 0 {
        if bytes.len() < PARAM_LARGE_HEADER_SIZE {
            return Err(QapError::Decode(format!(
                "Incomplete large parameter header: expected {} bytes, got {}",
                PARAM_LARGE_HEADER_SIZE,
                bytes.len()
            )));
        }
        let len = u32::from_le_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]) as usize;
        Ok((tag & !LARGE_FLAG, len, PARAM_LARGE_HEADER_SIZE))
    } else {
        let len = u32::from_le_bytes([bytes[1], bytes[2], bytes[3], 0]) as usize;
        Ok((tag, len, PARAM_HEADER_SIZE))
    }
}

/// Round `len` up to the next multiple of 4
pub(crate) fn align4(len: usize) -> usize {
    (len + 3) & !3
}

/// A single encoded command argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    data_type: DataType,
    block: Bytes,
}

impl Parameter {
    /// NUL-terminated string, padded to 4 bytes
    pub fn string(value: &str) -> Result<Self> {
        Self::padded(DataType::String, value.as_bytes(), true)
    }

    /// Raw byte stream, padded to 4 bytes
    pub fn bytes(value: &[u8]) -> Result<Self> {
        Self::padded(DataType::Bytestream, value, false)
    }

    /// 32-bit signed integer
    pub fn int(value: i32) -> Self {
        let mut block = BytesMut::with_capacity(PARAM_HEADER_SIZE + 4);
        block.put_u8(DataType::Int as u8);
        block.put_uint_le(4, 3);
        block.put_i32_le(value);
        Self {
            data_type: DataType::Int,
            block: block.freeze(),
        }
    }

    /// Encoded expression (see [`crate::sexp::encode_node`])
    pub fn sexp(expression: &Expression) -> Result<Self> {
        let node = sexp::encode_node(expression)?;
        let mut block = BytesMut::with_capacity(header_size_for(node.len()) + node.len());
        length_header(&mut block, DataType::Sexp as u8, node.len())?;
        block.put_slice(&node);
        Ok(Self {
            data_type: DataType::Sexp,
            block: block.freeze(),
        })
    }

    fn padded(data_type: DataType, value: &[u8], nul_terminate: bool) -> Result<Self> {
        let data_len = align4(value.len() + usize::from(nul_terminate));
        let mut block = BytesMut::with_capacity(header_size_for(data_len) + data_len);
        length_header(&mut block, data_type as u8, data_len)?;
        block.put_slice(value);
        block.put_bytes(0, data_len - value.len());
        Ok(Self {
            data_type,
            block: block.freeze(),
        })
    }

    /// Transport type of this block
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Full block: header plus padded data
    pub fn as_bytes(&self) -> &[u8] {
        &self.block
    }

    /// Total encoded length in bytes
    pub fn len(&self) -> usize {
        self.block.len()
    }

    pub fn is_empty(&self) -> bool {
        self.block.is_empty()
    }

    pub fn into_bytes(self) -> Bytes {
        self.block
    }
}
