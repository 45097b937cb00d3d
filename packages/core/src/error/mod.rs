//! Error handling for the JSON core
//!
//! Provides the error taxonomy shared by the token reader, the reference
//! resolver, the writer, and the graph deserializer, along with the
//! `JsonResult` alias used throughout the crate.

mod types;

pub use types::{JsonError, JsonResult};
