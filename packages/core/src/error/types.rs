//! JSON core error types
//!
//! Every failure in this crate is one of a small fixed set of fatal,
//! propagated errors. No component retries, logs-and-swallows, or recovers
//! locally; recovery policy belongs to the caller of the top-level
//! serialize or deserialize operation.

/// Errors reported by the token reader, resolver, writer, and deserializer
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JsonError {
    /// A structural open would push nesting past the configured bound
    #[error("maximum nesting depth {max_depth} exceeded at offset {offset}")]
    DepthExceeded {
        /// The configured inclusive depth bound
        max_depth: usize,
        /// Byte offset of the offending `{` or `[`
        offset: usize,
    },

    /// The input is not structurally valid JSON
    #[error("malformed JSON at offset {offset}: {reason}")]
    MalformedStructure {
        /// Byte offset where the violation was detected
        offset: usize,
        /// What was violated
        reason: String,
    },

    /// An `$id` was registered twice during deserialization
    #[error("duplicate reference id \"{id}\"")]
    DuplicateId {
        /// The colliding id string
        id: String,
    },

    /// A `$ref` named an id that was never registered
    #[error("reference \"{id}\" does not match any known object id")]
    UnknownReference {
        /// The dangling id string
        id: String,
    },

    /// An ancestor revisit was detected while serializing under the
    /// error-on-cycle policy
    #[error("object graph contains a reference cycle")]
    CycleDetected,
}

impl JsonError {
    /// Creates a depth error for an open token at `offset`
    #[must_use]
    pub fn depth_exceeded(max_depth: usize, offset: usize) -> Self {
        JsonError::DepthExceeded { max_depth, offset }
    }

    /// Creates a structural error with positional context
    pub fn malformed(offset: usize, reason: impl Into<String>) -> Self {
        JsonError::MalformedStructure {
            offset,
            reason: reason.into(),
        }
    }

    /// Creates a duplicate-id registration error
    pub fn duplicate_id(id: impl Into<String>) -> Self {
        JsonError::DuplicateId { id: id.into() }
    }

    /// Creates an unresolved-reference error
    pub fn unknown_reference(id: impl Into<String>) -> Self {
        JsonError::UnknownReference { id: id.into() }
    }

    /// Byte offset carried by positional errors, if any
    #[inline]
    #[must_use]
    pub fn offset(&self) -> Option<usize> {
        match self {
            JsonError::DepthExceeded { offset, .. }
            | JsonError::MalformedStructure { offset, .. } => Some(*offset),
            _ => None,
        }
    }
}

/// Result type for JSON core operations
pub type JsonResult<T> = Result<T, JsonError>;
