//! JSON emission: raw token writer and the cycle-aware graph serializer
//!
//! The raw writer is the token-level emitter; the serializer drives it
//! across a shared object graph under the configured cycle policy.

mod core;
mod raw;

pub use core::GraphSerializer;
pub use raw::RawJsonWriter;
