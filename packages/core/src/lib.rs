//! # Refson Core
//!
//! Reference-preserving JSON core: a depth-bounded zero-copy token
//! reader, a metadata-property fast-classifier, identity-keyed reference
//! resolution, and a cycle-aware object-graph serializer with a matching
//! envelope deserializer.
//!
//! ## Features
//!
//! - **Zero-copy token reading** with payloads exposed as spans into the
//!   borrowed input buffer, valid for the buffer's lifetime
//! - **Configurable depth bound** enforced identically by reader and
//!   writer, so depth behavior round-trips exactly
//! - **`$id`/`$ref`/`$values` envelopes** preserving shared references
//!   and cycles on the wire
//! - **Cycle policies** to preserve sharing, silently ignore ancestor
//!   revisits, or fail fast with a structured error
//! - **Shared graph model** with reference-counted container nodes giving
//!   values the pointer identity the resolver keys on
//!
//! The fluent public API lives in the `refson` crate; this package is the
//! implementation.

#![deny(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]

pub mod de;
pub mod error;
pub mod graph;
pub mod metadata;
pub mod options;
pub mod reader;
pub mod resolver;
pub mod writer;

pub use de::{GraphDeserializer, from_slice};
pub use error::{JsonError, JsonResult};
pub use graph::{ArrayNode, GraphValue, ObjectId, ObjectNode, Properties};
pub use metadata::{MetadataPropertyName, classify};
pub use options::{DEFAULT_MAX_DEPTH, JsonOptions, ReferenceHandling};
pub use reader::{JsonTokenKind, JsonTokenReader, TokenSpan, unescape};
pub use resolver::{DeserializeResolver, Reference, SerializeResolver};
pub use writer::{GraphSerializer, RawJsonWriter};

/// Serialize a graph with the given options
pub fn to_vec(root: &GraphValue, options: &JsonOptions) -> JsonResult<Vec<u8>> {
    GraphSerializer::new(options.clone()).serialize(root)
}
