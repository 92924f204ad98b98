//! Expression encoder
//!
//! Serializes the value shapes the server accepts for assignment: scalar
//! ints and doubles, int/double arrays and string arrays. Attributes are not
//! sent.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{QapError, Result};
use crate::protocol::{self, Parameter};

use super::{Expression, Value};

/// Encode an expression as a complete SEXP parameter block
pub fn encode_expression(expression: &Expression) -> Result<Bytes> {
    Ok(Parameter::sexp(expression)?.into_bytes())
}

/// Encode an expression node: type header plus payload, no parameter header
pub fn encode_node(expression: &Expression) -> Result<Bytes> {
    let code = expression.xp_type().code();

    let node = match expression.value() {
        Value::Double(v) => {
            let mut node = with_header(code, 8)?;
            node.put_f64_le(*v);
            node
        }
        Value::Int(v) => {
            let mut node = with_header(code, 4)?;
            node.put_i32_le(*v);
            node
        }
        Value::DoubleArray(values) => {
            let mut node = with_header(code, values.len() * 8)?;
            for v in values {
                node.put_f64_le(*v);
            }
            node
        }
        Value::IntArray(values) => {
            let mut node = with_header(code, values.len() * 4)?;
            for v in values {
                node.put_i32_le(*v);
            }
            node
        }
        Value::StrArray(values) => {
            // Each string NUL-terminated; the total is zero-padded to 4 bytes
            // and the header records the padded size.
            let raw_len: usize = values.iter().map(|s| s.len() + 1).sum();
            let padded_len = protocol::align4(raw_len);
            let mut node = with_header(code, padded_len)?;
            for s in values {
                node.put_slice(s.as_bytes());
                node.put_u8(0);
            }
            node.put_bytes(0, padded_len - raw_len);
            node
        }
        _ => return Err(QapError::UnsupportedEncoding(expression.xp_type())),
    };

    Ok(node.freeze())
}

fn with_header(code: u8, payload_len: usize) -> Result<BytesMut> {
    let mut node = BytesMut::with_capacity(protocol::header_size_for(payload_len) + payload_len);
    protocol::length_header(&mut node, code, payload_len)?;
    Ok(node)
}
