//! Decode Tests
//!
//! Tests for the recursive expression decoder and its reclassification rules.

use qapwire::sexp::tag::*;
use qapwire::sexp::{decode, decode_parameter};
use qapwire::{QapError, RBool, Value, XpType};

/// Short-form node: type byte, 3-byte length, payload
fn node(tag: u8, payload: &[u8]) -> Vec<u8> {
    let len = payload.len() as u32;
    let mut bytes = vec![tag, len as u8, (len >> 8) as u8, (len >> 16) as u8];
    bytes.extend_from_slice(payload);
    bytes
}

/// Node carrying an attribute node ahead of its payload
fn node_with_attr(tag: u8, attribute: &[u8], payload: &[u8]) -> Vec<u8> {
    let mut body = attribute.to_vec();
    body.extend_from_slice(payload);
    node(tag | XT_HAS_ATTR, &body)
}

fn str_node(text: &str) -> Vec<u8> {
    let mut payload = text.as_bytes().to_vec();
    payload.push(0);
    while payload.len() % 4 != 0 {
        payload.push(0);
    }
    node(XT_STR, &payload)
}

fn int_array(values: &[i32]) -> Vec<u8> {
    let payload: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
    node(XT_ARRAY_INT, &payload)
}

fn concat(parts: &[Vec<u8>]) -> Vec<u8> {
    parts.concat()
}

// =============================================================================
// Scalar Tests
// =============================================================================

#[test]
fn test_decode_int_and_double() {
    let (expr, next) = decode(&node(XT_INT, &42i32.to_le_bytes()), 0).unwrap();
    assert_eq!(expr.value(), &Value::Int(42));
    assert_eq!(next, 8);

    let (expr, next) = decode(&node(XT_DOUBLE, &2.5f64.to_le_bytes()), 0).unwrap();
    assert_eq!(expr.as_double(), 2.5);
    assert_eq!(next, 12);
}

#[test]
fn test_decode_at_offset() {
    let mut buf = vec![0xAA; 6];
    buf.extend(node(XT_INT, &7i32.to_le_bytes()));

    let (expr, next) = decode(&buf, 6).unwrap();
    assert_eq!(expr.as_int(), 7);
    assert_eq!(next, 14);
}

#[test]
fn test_decode_null() {
    let (expr, next) = decode(&node(XT_NULL, &[]), 0).unwrap();
    assert_eq!(expr.xp_type(), XpType::Null);
    assert_eq!(next, 4);
}

#[test]
fn test_decode_string_stops_at_nul() {
    let (expr, _) = decode(&node(XT_STR, b"hello\0\0\0"), 0).unwrap();
    assert_eq!(expr.as_str(), Some("hello"));

    // No terminator: runs to the node end
    let (expr, _) = decode(&node(XT_STR, b"abcd"), 0).unwrap();
    assert_eq!(expr.as_str(), Some("abcd"));
}

#[test]
fn test_decode_bool() {
    let (expr, next) = decode(&node(XT_BOOL, &[1, 0, 0, 0]), 0).unwrap();
    assert_eq!(expr.as_bool(), Some(RBool::True));
    assert_eq!(next, 8);

    let (expr, _) = decode(&node(XT_BOOL, &[0]), 0).unwrap();
    assert_eq!(expr.as_bool(), Some(RBool::False));

    let err = decode(&node(XT_BOOL, &[1, 0]), 0).unwrap_err();
    assert!(matches!(err, QapError::Decode(_)));
}

#[test]
fn test_decode_symbol() {
    let (expr, _) = decode(&node(XT_SYM, &str_node("x")), 0).unwrap();
    assert_eq!(expr.value(), &Value::Symbol("x".to_string()));
}

#[test]
fn test_decode_unknown_payload() {
    let (expr, _) = decode(&node(XT_UNKNOWN, &[9, 0, 0, 0]), 0).unwrap();
    assert_eq!(expr.value(), &Value::Unknown([9, 0, 0, 0]));
}

// =============================================================================
// Array Tests
// =============================================================================

#[test]
fn test_decode_int_array_ignores_partial_element() {
    let mut payload: Vec<u8> = [1i32, 2, 3].iter().flat_map(|v| v.to_le_bytes()).collect();
    payload.extend_from_slice(&[0xFF, 0xFF]);

    let buf = node(XT_ARRAY_INT, &payload);
    let (expr, next) = decode(&buf, 0).unwrap();
    assert_eq!(expr.as_int_array(), Some(vec![1, 2, 3]));
    assert_eq!(next, buf.len());
}

#[test]
fn test_decode_bool_array_with_count() {
    let buf = node(XT_ARRAY_BOOL, &[5, 0, 0, 0, 1, 0, 2, 1, 0, 0, 0, 0]);
    let (expr, next) = decode(&buf, 0).unwrap();

    assert_eq!(
        expr.value(),
        &Value::BoolArray(vec![
            RBool::True,
            RBool::False,
            RBool::NotAvailable,
            RBool::True,
            RBool::False
        ])
    );
    assert_eq!(next, 16);
}

#[test]
fn test_decode_legacy_bool_array() {
    let (expr, next) = decode(&node(XT_ARRAY_BOOL_UA, &[1, 1, 0]), 0).unwrap();
    assert_eq!(expr.xp_type(), XpType::ArrayBool);
    assert_eq!(
        expr.value(),
        &Value::BoolArray(vec![RBool::True, RBool::True, RBool::False])
    );
    assert_eq!(next, 7);
}

#[test]
fn test_decode_bool_array_count_overrun() {
    let err = decode(&node(XT_ARRAY_BOOL, &[9, 0, 0, 0, 1, 0, 0, 0]), 0).unwrap_err();
    assert!(matches!(err, QapError::Decode(_)));
}

#[test]
fn test_decode_string_array_drops_padding() {
    let (expr, _) = decode(&node(XT_ARRAY_STR, b"ab\0cde\0\x01"), 0).unwrap();
    assert_eq!(
        expr.value(),
        &Value::StrArray(vec!["ab".to_string(), "cde".to_string()])
    );
}

#[test]
fn test_decode_string_array_short_zero_tail_is_padding() {
    let (expr, _) = decode(&node(XT_ARRAY_STR, b"a\0\0\0"), 0).unwrap();
    assert_eq!(expr.value(), &Value::StrArray(vec!["a".to_string()]));

    // A full 4-byte zero run holds an empty string before the padding
    let (expr, _) = decode(&node(XT_ARRAY_STR, b"abc\0\0\0\0\0"), 0).unwrap();
    assert_eq!(
        expr.value(),
        &Value::StrArray(vec!["abc".to_string(), String::new()])
    );
}

#[test]
fn test_decode_large_header() {
    let payload: Vec<u8> = [10i32, 20].iter().flat_map(|v| v.to_le_bytes()).collect();
    let mut buf = vec![XT_ARRAY_INT | XT_LARGE, 8, 0, 0, 0, 0, 0, 0];
    buf.extend_from_slice(&payload);

    let (expr, next) = decode(&buf, 0).unwrap();
    assert_eq!(expr.as_int_array(), Some(vec![10, 20]));
    assert_eq!(next, 16);
}

// =============================================================================
// Recursive Tests
// =============================================================================

#[test]
fn test_decode_vector_in_order() {
    let buf = node(
        XT_VECTOR,
        &concat(&[node(XT_INT, &1i32.to_le_bytes()), str_node("two")]),
    );
    let (expr, next) = decode(&buf, 0).unwrap();

    let elements = expr.as_vector().unwrap();
    assert_eq!(elements.len(), 2);
    assert_eq!(elements[0].as_int(), 1);
    assert_eq!(elements[1].as_str(), Some("two"));
    assert_eq!(next, buf.len());
}

#[test]
fn test_decode_list_and_lang_with_tag() {
    let parts = concat(&[str_node("head"), str_node("body"), str_node("tag")]);

    let (expr, _) = decode(&node(XT_LIST, &parts), 0).unwrap();
    let list = expr.as_list().unwrap();
    assert_eq!(list.head().as_str(), Some("head"));
    assert_eq!(list.body().as_str(), Some("body"));
    assert_eq!(list.tag().and_then(|t| t.as_str()), Some("tag"));

    let (expr, _) = decode(&node(XT_LANG, &parts[..24]), 0).unwrap();
    match expr.value() {
        Value::Lang(lang) => assert!(lang.tag().is_none()),
        other => panic!("Expected LANG, got {:?}", other),
    }
}

#[test]
fn test_decode_closure_keeps_body() {
    let buf = node(XT_CLOS, &concat(&[node(XT_NULL, &[]), str_node("x + 1")]));
    let (expr, _) = decode(&buf, 0).unwrap();
    match expr.value() {
        Value::Closure(body) => assert_eq!(body.as_str(), Some("x + 1")),
        other => panic!("Expected closure, got {:?}", other),
    }
}

#[test]
fn test_unrecognized_tag_does_not_abort_siblings() {
    let buf = node(
        XT_VECTOR,
        &concat(&[node(0x1F, &[1, 2, 3, 4]), node(XT_INT, &5i32.to_le_bytes())]),
    );
    let (expr, _) = decode(&buf, 0).unwrap();

    let elements = expr.as_vector().unwrap();
    assert_eq!(elements[0].xp_type(), XpType::Unrecognized(0x1F));
    assert_eq!(elements[1].as_int(), 5);
}

#[test]
fn test_trailing_bytes_inside_node_are_skipped() {
    // INT node declares 8 bytes; the decoder must land on the sibling anyway
    let buf = node(
        XT_VECTOR,
        &concat(&[
            node(XT_INT, &[3, 0, 0, 0, 0xEE, 0xEE, 0xEE, 0xEE]),
            node(XT_INT, &4i32.to_le_bytes()),
        ]),
    );
    let (expr, _) = decode(&buf, 0).unwrap();
    let elements = expr.as_vector().unwrap();
    assert_eq!(elements[0].as_int(), 3);
    assert_eq!(elements[1].as_int(), 4);
}

#[test]
fn test_length_overrun_is_decode_error() {
    let mut buf = node(XT_ARRAY_INT, &[0; 8]);
    buf[1] = 200;
    let err = decode(&buf, 0).unwrap_err();
    assert!(matches!(err, QapError::Decode(_)));
}

#[test]
fn test_truncated_int_is_decode_error() {
    let err = decode(&node(XT_INT, &[1, 2]), 0).unwrap_err();
    assert!(matches!(err, QapError::Decode(_)));
}

// =============================================================================
// Reclassification Tests
// =============================================================================

#[test]
fn test_int_array_with_factor_attribute_becomes_factor() {
    let levels = node(XT_VECTOR, &concat(&[str_node("a"), str_node("b")]));
    let class = node(XT_LIST, &concat(&[str_node("factor"), node(XT_NULL, &[])]));
    let attribute = node(XT_LIST, &concat(&[levels, class]));

    let mut ids = Vec::new();
    for id in [1i32, 2, 1] {
        ids.extend_from_slice(&id.to_le_bytes());
    }
    let buf = node_with_attr(XT_ARRAY_INT, &attribute, &ids);

    let (expr, next) = decode(&buf, 0).unwrap();
    assert_eq!(next, buf.len());
    assert_eq!(expr.xp_type(), XpType::Factor);
    assert!(expr.attribute().is_none());

    let factor = expr.as_factor().unwrap();
    assert_eq!(factor.ids(), &[0, 1, 0]);
    assert_eq!(factor.at(0), Some("a"));
    assert_eq!(factor.at(1), Some("b"));
    assert_eq!(factor.at(2), Some("a"));
}

#[test]
fn test_factor_class_as_string_vector() {
    let levels = node(XT_VECTOR, &str_node("only"));
    let class_name = node(XT_VECTOR, &str_node("factor"));
    let class = node(XT_LIST, &concat(&[class_name, node(XT_NULL, &[])]));
    let attribute = node(XT_LIST, &concat(&[levels, class]));
    let buf = node_with_attr(XT_ARRAY_INT, &attribute, &1i32.to_le_bytes());

    let (expr, _) = decode(&buf, 0).unwrap();
    assert_eq!(expr.as_factor().unwrap().at(0), Some("only"));
}

#[test]
fn test_int_array_with_other_attribute_kept() {
    let dims = int_array(&[2, 2]);
    let attribute = node(XT_LIST, &concat(&[dims, str_node("dim")]));
    let buf = node_with_attr(XT_ARRAY_INT, &attribute, &[0; 16]);

    let (expr, _) = decode(&buf, 0).unwrap();
    assert_eq!(expr.xp_type(), XpType::ArrayInt);
    assert!(expr.attribute().is_some());
}

#[test]
fn test_vector_with_list_attribute_becomes_list() {
    let names = node(XT_VECTOR, &concat(&[str_node("x"), str_node("y")]));
    let attribute = node(XT_LIST, &concat(&[names, node(XT_NULL, &[])]));
    let values = concat(&[
        node(XT_INT, &1i32.to_le_bytes()),
        node(XT_INT, &2i32.to_le_bytes()),
    ]);
    let buf = node_with_attr(XT_VECTOR, &attribute, &values);

    let (expr, _) = decode(&buf, 0).unwrap();
    assert_eq!(expr.xp_type(), XpType::List);

    let list = expr.as_list().unwrap();
    assert!(list.standardize());
    assert_eq!(list.at_key("y").map(|e| e.as_int()), Some(2));
    assert_eq!(list.keys(), Some(vec![Some("x"), Some("y")]));
}

#[test]
fn test_single_string_head_wrapped_into_vector() {
    let attribute = node(XT_LIST, &concat(&[str_node("only"), node(XT_NULL, &[])]));
    let buf = node_with_attr(XT_VECTOR, &attribute, &node(XT_INT, &9i32.to_le_bytes()));

    let (expr, _) = decode(&buf, 0).unwrap();
    let list = expr.as_list().unwrap();
    assert_eq!(list.head().xp_type(), XpType::Vector);
    assert_eq!(list.at_key("only").map(|e| e.as_int()), Some(9));
}

#[test]
fn test_reclassified_list_takes_attribute_of_attribute() {
    let inner = node(XT_LIST, &concat(&[str_node("meta"), node(XT_NULL, &[])]));
    let names = node(XT_VECTOR, &str_node("k"));
    let attribute = node_with_attr(XT_LIST, &inner, &concat(&[names, node(XT_NULL, &[])]));
    let buf = node_with_attr(XT_VECTOR, &attribute, &str_node("v"));

    let (expr, _) = decode(&buf, 0).unwrap();
    assert_eq!(expr.xp_type(), XpType::List);
    let shifted = expr.attribute().and_then(|a| a.as_list()).unwrap();
    assert_eq!(shifted.head().as_str(), Some("meta"));
}

// =============================================================================
// Parameter Tests
// =============================================================================

#[test]
fn test_decode_parameter() {
    let inner = node(XT_INT, &11i32.to_le_bytes());
    let mut block = vec![10, inner.len() as u8, 0, 0];
    block.extend_from_slice(&inner);

    assert_eq!(decode_parameter(&block).unwrap().as_int(), 11);
}

#[test]
fn test_decode_parameter_wrong_type() {
    let block = [4u8, 4, 0, 0, b'a', 0, 0, 0];
    let err = decode_parameter(&block).unwrap_err();
    assert!(matches!(err, QapError::UnexpectedResponse(_)));
}
