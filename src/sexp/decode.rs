//! Expression decoder
//!
//! ## Node Format
//! ```text
//! ┌────────────────────┬──────────────┬─────────────────┬─────────────────┐
//! │ Flags|Type (1)     │ Len (3 or 4) │ Attribute node  │ Payload         │
//! │ 0x80 attr 0x40 big │              │ (if 0x80 set)   │ (type-specific) │
//! └────────────────────┴──────────────┴─────────────────┴─────────────────┘
//! ```
//! `Len` covers the attribute and the payload. A large header is 8 bytes with
//! a 4-byte length followed by 3 unused bytes.
//!
//! Decoding is lenient about sizes: once a node's payload is read the cursor
//! jumps to the node's declared end, so padding or trailing junk inside a node
//! never shifts its siblings. Only a length that runs past the buffer, or a
//! scalar with too few bytes, is a hard error.
//!
//! Two shapes are rebuilt after decoding:
//! - an int array whose attribute marks it as `"factor"` becomes a [`Factor`]
//! - a vector whose attribute is a list becomes a [`RList`] keyed by the
//!   attribute's head

use crate::error::{QapError, Result};
use crate::protocol::{self, DataType};

use super::cursor::Cursor;
use super::tag::*;
use super::{Expression, Factor, RBool, RList, Value};

/// Decode one expression starting at `offset`.
///
/// Returns the expression and the offset just past it.
pub fn decode(buf: &[u8], offset: usize) -> Result<(Expression, usize)> {
    let mut cursor = Cursor::new(buf, offset);
    let expression = decode_node(&mut cursor)?;
    Ok((expression, cursor.position()))
}

/// Decode an expression wrapped in a SEXP parameter block
pub fn decode_parameter(block: &[u8]) -> Result<Expression> {
    let (data_type, length, header_size) = protocol::parse_header(block)?;
    if DataType::from_code(data_type) != Some(DataType::Sexp) {
        return Err(QapError::UnexpectedResponse(format!(
            "SEXP parameter expected but found type {}",
            data_type
        )));
    }
    if header_size + length > block.len() {
        return Err(QapError::Decode(format!(
            "SEXP parameter claims {} bytes but only {} follow the header",
            length,
            block.len() - header_size
        )));
    }
    let (expression, _) = decode(block, header_size)?;
    Ok(expression)
}

fn decode_node(cursor: &mut Cursor<'_>) -> Result<Expression> {
    let node_start = cursor.position();
    let first = cursor.read_u8()?;
    let is_large = first & XT_LARGE != 0;
    let has_attribute = first & XT_HAS_ATTR != 0;
    let code = first & XT_TYPE_MASK;

    let length = if is_large {
        let length = cursor.read_u32_le()?;
        cursor.take(3)?;
        length as usize
    } else {
        cursor.read_u24_le()? as usize
    };

    let start = cursor.position();
    let end = start
        .checked_add(length)
        .filter(|end| *end <= cursor.len())
        .ok_or_else(|| {
            QapError::Decode(format!(
                "Node at offset {} claims {} bytes but only {} remain",
                node_start,
                length,
                cursor.len() - start
            ))
        })?;

    let attribute = if has_attribute {
        Some(Box::new(decode_node(cursor)?))
    } else {
        None
    };

    let value = decode_payload(cursor, code, end)?;

    if cursor.position() != end {
        tracing::trace!(
            "Node type {} at offset {} ended at {}, forcing declared end {}",
            code,
            node_start,
            cursor.position(),
            end
        );
    }
    cursor.seek(end)?;

    Ok(reclassify(value, attribute))
}

fn decode_payload(cursor: &mut Cursor<'_>, code: u8, end: usize) -> Result<Value> {
    let remaining = end.saturating_sub(cursor.position());

    let value = match code {
        XT_NULL => Value::Null,

        XT_INT => {
            require(remaining, 4, "INT")?;
            Value::Int(cursor.read_i32_le()?)
        }

        XT_DOUBLE => {
            require(remaining, 8, "DOUBLE")?;
            Value::Double(cursor.read_f64_le()?)
        }

        XT_ARRAY_INT => {
            let values = (0..remaining / 4)
                .map(|_| cursor.read_i32_le())
                .collect::<Result<Vec<_>>>()?;
            Value::IntArray(values)
        }

        XT_ARRAY_DOUBLE => {
            let values = (0..remaining / 8)
                .map(|_| cursor.read_f64_le())
                .collect::<Result<Vec<_>>>()?;
            Value::DoubleArray(values)
        }

        XT_BOOL => {
            require(remaining, 1, "BOOL")?;
            let value = RBool::from_code(cursor.read_u8()?);
            // 1 data byte, optionally followed by 3 alignment bytes
            if remaining != 1 && remaining != 4 {
                return Err(QapError::Decode(format!(
                    "BOOL node size mismatch: {} bytes",
                    remaining
                )));
            }
            Value::Bool(value)
        }

        XT_ARRAY_BOOL_UA => {
            let bytes = cursor.take(remaining)?;
            Value::BoolArray(bytes.iter().copied().map(RBool::from_code).collect())
        }

        XT_ARRAY_BOOL => {
            require(remaining, 4, "ARRAY_BOOL")?;
            let count = cursor.read_u32_le()? as usize;
            if count > remaining - 4 {
                return Err(QapError::Decode(format!(
                    "ARRAY_BOOL declares {} values but only {} bytes remain",
                    count,
                    remaining - 4
                )));
            }
            let bytes = cursor.take(count)?;
            Value::BoolArray(bytes.iter().copied().map(RBool::from_code).collect())
        }

        XT_STR => {
            let bytes = cursor.take(remaining)?;
            let text = bytes.split(|b| *b == 0).next().unwrap_or_default();
            Value::Str(String::from_utf8_lossy(text).into_owned())
        }

        XT_ARRAY_STR => Value::StrArray(split_strings(cursor.take(remaining)?)),

        XT_SYM => {
            let printname = decode_node(cursor)?;
            let name = match printname.value() {
                Value::Str(s) => s.clone(),
                _ => printname.to_string(),
            };
            Value::Symbol(name)
        }

        XT_VECTOR => {
            let mut elements = Vec::new();
            while cursor.position() < end {
                elements.push(decode_node(cursor)?);
            }
            Value::Vector(elements)
        }

        XT_LIST | XT_LANG => {
            let head = decode_node(cursor)?;
            let body = decode_node(cursor)?;
            let mut list = RList::new(head, body);
            if cursor.position() < end {
                list = list.with_tag(decode_node(cursor)?);
            }
            if code == XT_LIST {
                Value::List(list)
            } else {
                Value::Lang(list)
            }
        }

        XT_CLOS => {
            let _formals = decode_node(cursor)?;
            let body = decode_node(cursor)?;
            Value::Closure(Box::new(body))
        }

        XT_UNKNOWN => {
            require(remaining, 4, "UNKNOWN")?;
            Value::Unknown(cursor.read_array::<4>()?)
        }

        other => {
            tracing::warn!("Skipping node with unhandled type {}", other);
            Value::Unrecognized(other)
        }
    };

    Ok(value)
}

fn require(remaining: usize, needed: usize, what: &str) -> Result<()> {
    if remaining < needed {
        return Err(QapError::Decode(format!(
            "{} node needs {} bytes, has {}",
            what, needed, remaining
        )));
    }
    Ok(())
}

/// Split a string-array payload into its NUL-terminated strings.
///
/// A tail shorter than 4 bytes made only of 0x00/0x01 is alignment padding.
/// Empty strings look the same as padding, so a trailing empty string is
/// kept only when it starts at least 4 bytes before the end: `["abc", ""]`
/// survives a round trip, `["a", ""]` comes back as `["a"]` and `["", ""]`
/// as `[""]`.
fn split_strings(payload: &[u8]) -> Vec<String> {
    let mut strings = Vec::new();
    let mut rest = payload;

    while !rest.is_empty() {
        if rest.len() < 4 && rest.iter().all(|b| *b == 0 || *b == 1) {
            break;
        }
        let (text, tail) = match rest.iter().position(|b| *b == 0) {
            Some(nul) => (&rest[..nul], &rest[nul + 1..]),
            None => (rest, &rest[rest.len()..]),
        };
        strings.push(String::from_utf8_lossy(text).into_owned());
        rest = tail;
    }

    strings
}

// =============================================================================
// Post-decode reclassification
// =============================================================================

fn reclassify(value: Value, attribute: Option<Box<Expression>>) -> Expression {
    match value {
        Value::IntArray(ids) => match attribute {
            Some(attribute) => match factor_levels(&attribute) {
                Some(levels) => Expression::factor(Factor::from_wire(&ids, levels)),
                None => Expression::from_parts(Value::IntArray(ids), Some(attribute)),
            },
            None => Expression::int_array(ids),
        },
        Value::Vector(elements) => match attribute.map(|attribute| (*attribute).into_parts()) {
            Some((Value::List(names), outer)) => {
                let (head, _, _) = names.into_parts();
                let list = RList::new(vector_head(head), Expression::vector(elements));
                Expression::from_parts(Value::List(list), outer)
            }
            Some((value, inner)) => Expression::from_parts(
                Value::Vector(elements),
                Some(Box::new(Expression::from_parts(value, inner))),
            ),
            None => Expression::vector(elements),
        },
        value => Expression::from_parts(value, attribute),
    }
}

/// Level names if `attribute` is `List{head: Vector(levels), body: List{head: "factor"}}`
fn factor_levels(attribute: &Expression) -> Option<&[Expression]> {
    let list = attribute.as_list()?;
    let levels = list.head().as_vector()?;
    let class = list.body().as_list()?.head();

    let is_factor = match class.value() {
        Value::Str(name) => name == "factor",
        Value::Vector(names) => names.len() == 1 && names[0].as_str() == Some("factor"),
        _ => false,
    };

    is_factor.then_some(levels)
}

/// A single string head is wrapped into a one-element vector so key lookups
/// work the same for one name as for many. The head's attribute moves to
/// the wrapping vector.
fn vector_head(head: Expression) -> Expression {
    match head.into_parts() {
        (Value::Str(name), attribute) => Expression::from_parts(
            Value::Vector(vec![Expression::string(name)]),
            attribute,
        ),
        (value, attribute) => Expression::from_parts(value, attribute),
    }
}
