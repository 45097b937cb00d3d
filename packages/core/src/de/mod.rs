//! Reference-preserving graph deserialization
//!
//! Turns `$id`/`$ref`/`$values` envelope documents back into shared
//! object graphs, resolving references through a deserialize-mode
//! resolver in document order.

mod core;

pub use core::{GraphDeserializer, from_slice};
