//! Token reader depth enforcement and structural validation
//!
//! Documents are generated with the raw writer so the reader and writer
//! exercise the same depth bound: one object nested per level under
//! `message{i}` property names, with a single string at the bottom.

use refson_core::{JsonError, JsonOptions, JsonResult, JsonTokenKind, JsonTokenReader, RawJsonWriter};

/// Build a document whose total nesting depth is exactly `depth`
fn nested_document(depth: usize) -> Vec<u8> {
    let options = JsonOptions::default().max_depth(depth);
    let mut writer = RawJsonWriter::new(&options);
    writer.write_start_object().expect("root open");
    for level in 0..depth - 1 {
        writer.write_property_name(&format!("message{level}"));
        writer.write_start_object().expect("nested open");
    }
    writer.write_property_name(&format!("message{}", depth - 1));
    writer.write_string("Hello, World!");
    for _ in 0..depth - 1 {
        writer.write_end_object().expect("nested close");
    }
    writer.write_end_object().expect("root close");
    writer.finish().expect("balanced document")
}

fn read_to_end(input: &[u8], max_depth: usize) -> JsonResult<usize> {
    let options = JsonOptions::default().max_depth(max_depth);
    let mut reader = JsonTokenReader::new(input, &options);
    let mut tokens = 0;
    while reader.advance()?.is_some() {
        tokens += 1;
    }
    Ok(tokens)
}

#[test]
fn test_reads_succeed_up_to_the_configured_bound() {
    for depth in [1, 2, 4, 8, 16, 32, 64, 65, 66, 128, 256, 512] {
        let document = nested_document(depth);
        read_to_end(&document, depth)
            .unwrap_or_else(|error| panic!("depth {depth} should read: {error}"));
    }
}

#[test]
fn test_depth_nine_against_bound_eight_fails_at_ninth_open() {
    let document = nested_document(9);
    let error = read_to_end(&document, 8).expect_err("bound is exceeded");
    assert_eq!(
        error,
        JsonError::DepthExceeded {
            max_depth: 8,
            offset: error.offset().expect("depth errors carry an offset"),
        }
    );

    // The reader stops exactly at the ninth nested open: eight opens and
    // eight property names succeed first.
    let options = JsonOptions::default().max_depth(8);
    let mut reader = JsonTokenReader::new(&document, &options);
    let mut tokens = 0;
    while reader.advance().is_ok_and(|kind| kind.is_some()) {
        tokens += 1;
    }
    assert_eq!(tokens, 16, "8 StartObject + 8 PropertyName tokens");
    assert_eq!(reader.depth(), 8);
}

#[test]
fn test_default_bound_is_sixty_four() {
    let document = nested_document(65);
    let options = JsonOptions::default();
    let mut reader = JsonTokenReader::new(&document, &options);
    let error = loop {
        match reader.advance() {
            Ok(Some(_)) => {}
            Ok(None) => panic!("depth 65 must not read under the default bound"),
            Err(error) => break error,
        }
    };
    assert!(matches!(error, JsonError::DepthExceeded { max_depth: 64, .. }));
}

#[test]
fn test_failed_reader_is_poisoned() {
    let document = nested_document(9);
    let options = JsonOptions::default().max_depth(8);
    let mut reader = JsonTokenReader::new(&document, &options);
    let first = loop {
        match reader.advance() {
            Ok(_) => {}
            Err(error) => break error,
        }
    };
    let second = reader.advance().expect_err("poisoned reader re-reports");
    assert_eq!(first, second);
}

#[test]
fn test_token_sequence_and_zero_copy_spans() {
    let input = br#"{"a":[1,"x",true,null]}"#;
    let options = JsonOptions::default();
    let mut reader = JsonTokenReader::new(input, &options);

    let expected = [
        JsonTokenKind::StartObject,
        JsonTokenKind::PropertyName,
        JsonTokenKind::StartArray,
        JsonTokenKind::Number,
        JsonTokenKind::String,
        JsonTokenKind::True,
        JsonTokenKind::Null,
        JsonTokenKind::EndArray,
        JsonTokenKind::EndObject,
    ];
    for kind in expected {
        assert_eq!(reader.advance().expect("valid document"), Some(kind));
        if kind == JsonTokenKind::PropertyName {
            assert_eq!(reader.token_bytes(), b"a");
        }
        if kind == JsonTokenKind::String {
            // The span indexes the original buffer, quotes excluded
            assert_eq!(reader.token_bytes(), b"x");
            assert_eq!(reader.token_span().offset, 9);
        }
    }
    assert_eq!(reader.advance().expect("clean end"), None);
}

#[test]
fn test_unmatched_close_is_malformed() {
    for input in [&b"}"[..], b"]", b"[1,2]]", b"{\"a\":1}}"] {
        let error = read_to_end(input, 64).expect_err("unmatched close");
        assert!(matches!(error, JsonError::MalformedStructure { .. }));
    }
}

#[test]
fn test_mismatched_close_is_malformed() {
    let error = read_to_end(b"[1,2}", 64).expect_err("mismatched close");
    assert!(matches!(error, JsonError::MalformedStructure { .. }));
}

#[test]
fn test_truncated_documents_are_malformed() {
    for input in [&b"{\"a\":"[..], b"[1,", b"\"abc", b"tru", b"{\"a\"", b"-"] {
        let error = read_to_end(input, 64).expect_err("truncated document");
        assert!(matches!(error, JsonError::MalformedStructure { .. }));
    }
}

#[test]
fn test_trailing_characters_are_malformed() {
    let error = read_to_end(b"{} x", 64).expect_err("trailing characters");
    assert!(matches!(error, JsonError::MalformedStructure { .. }));
}

#[test]
fn test_empty_input_reads_as_no_tokens() {
    assert_eq!(read_to_end(b"", 64).expect("empty buffer"), 0);
    assert_eq!(read_to_end(b"   \n\t", 64).expect("whitespace only"), 0);
}

#[test]
fn test_strict_number_grammar() {
    for input in [&b"01"[..], b"1.", b"1e", b"1e+", b"[-]"] {
        let error = read_to_end(input, 64).expect_err("invalid number");
        assert!(matches!(error, JsonError::MalformedStructure { .. }));
    }
    for input in [&b"0"[..], b"-12", b"3.25", b"1e9", b"2.5E-10"] {
        assert_eq!(read_to_end(input, 64).expect("valid number"), 1);
    }
}
