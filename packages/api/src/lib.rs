//! # Refson Public API
//!
//! Reference-preserving JSON with a fluent builder pattern. Serialization
//! walks shared object graphs under a configurable cycle policy; reading
//! rebuilds sharing from `$id`/`$ref`/`$values` envelopes under the same
//! depth bound.
//!
//! ```rust
//! use refson::{GraphValue, ObjectNode, Refson};
//!
//! let node = ObjectNode::new();
//! node.insert("name", GraphValue::from("widget"));
//! node.insert("parent", GraphValue::Object(node.clone()));
//!
//! let json = Refson::serializer()
//!     .preserve_references()
//!     .to_string(&GraphValue::Object(node))
//!     .expect("cycles are representable under preserve");
//! assert!(json.contains("$ref"));
//! ```

#![deny(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]

pub mod builder;

// Re-export all public API components
pub use builder::*;

// Re-export important types from the core package
pub use refson_core::{
    ArrayNode, DEFAULT_MAX_DEPTH, GraphValue, JsonError, JsonOptions, JsonResult, JsonTokenKind,
    JsonTokenReader, MetadataPropertyName, ObjectId, ObjectNode, ReferenceHandling, TokenSpan,
    classify,
};

/// Main entry point providing static builder methods
pub struct Refson;

impl Refson {
    /// Create a new serializer builder
    ///
    /// Shorthand for `SerializerBuilder::new()`
    #[must_use]
    pub fn serializer() -> SerializerBuilder {
        SerializerBuilder::new()
    }

    /// Create a new deserializer builder
    ///
    /// Shorthand for `DeserializerBuilder::new()`
    #[must_use]
    pub fn deserializer() -> DeserializerBuilder {
        DeserializerBuilder::new()
    }
}

/// Serialize a graph with default options
pub fn to_vec(root: &GraphValue) -> JsonResult<Vec<u8>> {
    Refson::serializer().to_vec(root)
}

/// Serialize a graph to a string with default options
pub fn to_string(root: &GraphValue) -> JsonResult<String> {
    Refson::serializer().to_string(root)
}

/// Parse a reference-preserving document with default options
pub fn from_slice(input: &[u8]) -> JsonResult<GraphValue> {
    Refson::deserializer().from_slice(input)
}

/// Parse a reference-preserving string with default options
pub fn from_str(input: &str) -> JsonResult<GraphValue> {
    Refson::deserializer().from_str(input)
}

/// Build a graph from any serde-serializable value
///
/// The result is a fresh tree; serde data models cannot express sharing,
/// so none is introduced.
pub fn graph<T: serde::Serialize>(value: &T) -> JsonResult<GraphValue> {
    let tree = serde_json::to_value(value)
        .map_err(|error| JsonError::malformed(0, error.to_string()))?;
    Ok(GraphValue::from_json(&tree))
}
