//! Envelope deserializer: metadata handling and strictness
//!
//! Exercises the composition of the token reader, the metadata
//! classifier, and the deserialize-mode resolver over well-formed and
//! adversarial documents.

use refson_core::{GraphValue, JsonError, JsonOptions, from_slice};

fn parse(input: &[u8]) -> Result<GraphValue, JsonError> {
    from_slice(input, &JsonOptions::default())
}

#[test]
fn test_plain_document_parses_to_equivalent_tree() {
    let input = br#"{"a":[1,2],"b":{"c":true},"d":"text"}"#;
    let value = parse(input).expect("plain document");
    let tree = value.to_json().expect("acyclic");
    let expected: serde_json::Value = serde_json::from_slice(input).expect("reference parse");
    assert_eq!(tree, expected);
}

#[test]
fn test_nested_ref_resolves_to_the_registered_node() {
    let value = parse(br#"{"$id":"1","self":{"$ref":"1"}}"#).expect("self reference");
    match &value {
        GraphValue::Object(node) => match node.get("self") {
            Some(GraphValue::Object(inner)) => assert!(inner.ptr_eq(node)),
            other => panic!("expected resolved reference, got {other:?}"),
        },
        other => panic!("expected object, got {other:?}"),
    }
}

#[test]
fn test_later_ref_resolves_across_subtrees() {
    let value = parse(br#"{"first":{"$id":"7","k":1},"second":{"$ref":"7"}}"#)
        .expect("cross-subtree reference");
    match &value {
        GraphValue::Object(node) => {
            let (Some(GraphValue::Object(first)), Some(GraphValue::Object(second))) =
                (node.get("first"), node.get("second"))
            else {
                panic!("both properties must be objects");
            };
            assert!(first.ptr_eq(&second));
        }
        other => panic!("expected object, got {other:?}"),
    }
}

#[test]
fn test_values_envelope_parses_as_shared_array() {
    let value = parse(br#"{"a":{"$id":"1","$values":[1,2,3]},"b":{"$ref":"1"}}"#)
        .expect("array envelope");
    match &value {
        GraphValue::Object(node) => {
            let (Some(GraphValue::Array(a)), Some(GraphValue::Array(b))) =
                (node.get("a"), node.get("b"))
            else {
                panic!("envelope must resolve to arrays");
            };
            assert!(a.ptr_eq(&b));
            assert_eq!(a.len(), 3);
        }
        other => panic!("expected object, got {other:?}"),
    }
}

#[test]
fn test_duplicate_id_is_rejected() {
    let error = parse(br#"{"a":{"$id":"1"},"b":{"$id":"1"}}"#).expect_err("colliding ids");
    assert_eq!(error, JsonError::DuplicateId { id: "1".to_string() });
}

#[test]
fn test_unknown_ref_is_rejected() {
    let error = parse(br#"{"$ref":"9"}"#).expect_err("dangling reference");
    assert_eq!(error, JsonError::UnknownReference { id: "9".to_string() });
}

#[test]
fn test_ref_with_sibling_properties_is_rejected() {
    let error =
        parse(br#"{"a":{"$id":"1"},"b":{"$ref":"1","extra":1}}"#).expect_err("$ref must be alone");
    assert!(matches!(error, JsonError::MalformedStructure { .. }));
}

#[test]
fn test_mid_object_metadata_is_rejected() {
    for input in [
        &br#"{"a":1,"$id":"2"}"#[..],
        br#"{"a":1,"$ref":"2"}"#,
        br#"{"$id":"1","x":1,"$values":[1]}"#,
    ] {
        let error = parse(input).expect_err("metadata must begin the object");
        assert!(matches!(error, JsonError::MalformedStructure { .. }));
    }
}

#[test]
fn test_values_without_id_is_rejected() {
    let error = parse(br#"{"$values":[1,2]}"#).expect_err("$values needs $id");
    assert!(matches!(error, JsonError::MalformedStructure { .. }));
}

#[test]
fn test_values_must_hold_an_array() {
    let error = parse(br#"{"$id":"1","$values":3}"#).expect_err("non-array $values");
    assert!(matches!(error, JsonError::MalformedStructure { .. }));
}

#[test]
fn test_properties_after_values_are_rejected() {
    let error =
        parse(br#"{"$id":"1","$values":[],"x":1}"#).expect_err("$values must be final");
    assert!(matches!(error, JsonError::MalformedStructure { .. }));
}

#[test]
fn test_non_string_metadata_values_are_rejected() {
    for input in [&br#"{"$id":1}"#[..], br#"{"$ref":1}"#, br#"{"$id":null}"#] {
        let error = parse(input).expect_err("metadata values must be strings");
        assert!(matches!(error, JsonError::MalformedStructure { .. }));
    }
}

#[test]
fn test_unreserved_dollar_properties_are_ordinary_data() {
    let value = parse(br#"{"$idddd":1,"values":2,"$Id":3}"#).expect("ordinary properties");
    match &value {
        GraphValue::Object(node) => {
            assert_eq!(node.len(), 3);
            assert!(node.get("$idddd").is_some());
        }
        other => panic!("expected object, got {other:?}"),
    }
}

#[test]
fn test_escapes_decode_in_names_and_strings() {
    let value = parse(br#"{"a\nb":"AA\t"}"#).expect("escaped content");
    match &value {
        GraphValue::Object(node) => {
            match node.get("a\nb") {
                Some(GraphValue::String(text)) => assert_eq!(text, "AA\t"),
                other => panic!("expected string, got {other:?}"),
            }
        }
        other => panic!("expected object, got {other:?}"),
    }
}

#[test]
fn test_number_formatting_survives() {
    let value = parse(br#"[3,2.5,-7,1e3]"#).expect("numbers");
    let tree = value.to_json().expect("acyclic");
    assert_eq!(tree[0].as_i64(), Some(3));
    assert_eq!(tree[1].as_f64(), Some(2.5));
    assert_eq!(tree[2].as_i64(), Some(-7));
    assert_eq!(tree[3].as_f64(), Some(1000.0));
}

#[test]
fn test_empty_and_whitespace_documents_are_rejected() {
    for input in [&b""[..], b"  \n\t "] {
        let error = parse(input).expect_err("no top-level value");
        assert!(matches!(error, JsonError::MalformedStructure { .. }));
    }
}

#[test]
fn test_depth_bound_applies_to_deserialization() {
    let error = from_slice(
        br#"{"a":{"b":{"c":1}}}"#,
        &JsonOptions::default().max_depth(2),
    )
    .expect_err("three levels against a bound of two");
    assert!(matches!(error, JsonError::DepthExceeded { max_depth: 2, .. }));
}

#[test]
fn test_id_only_envelope_is_an_empty_object() {
    let value = parse(br#"{"a":{"$id":"1"},"b":{"$ref":"1"}}"#).expect("bare envelope");
    match &value {
        GraphValue::Object(node) => {
            let (Some(GraphValue::Object(a)), Some(GraphValue::Object(b))) =
                (node.get("a"), node.get("b"))
            else {
                panic!("expected objects");
            };
            assert!(a.ptr_eq(&b));
            assert!(a.is_empty());
        }
        other => panic!("expected object, got {other:?}"),
    }
}
