//! Core builder structures and base functionality
//!
//! Contains the serializer and deserializer builders wrapping
//! `JsonOptions` with chainable configuration and terminal methods.

use refson_core::{
    GraphSerializer, GraphValue, JsonError, JsonOptions, JsonResult, ReferenceHandling,
};

/// Fluent configuration for a serialize operation
#[derive(Debug, Clone, Default)]
pub struct SerializerBuilder {
    options: JsonOptions,
    debug_enabled: bool,
}

impl SerializerBuilder {
    /// Start building with default options (depth 64, error-on-cycle)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the inclusive maximum nesting depth
    #[must_use]
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.options.max_depth = max_depth;
        self
    }

    /// Emit `$id`/`$ref`/`$values` envelopes preserving shared references
    #[must_use]
    pub fn preserve_references(mut self) -> Self {
        self.options.reference_handling = ReferenceHandling::Preserve;
        self
    }

    /// Silently omit ancestor revisits instead of failing
    #[must_use]
    pub fn ignore_cycles(mut self) -> Self {
        self.options.reference_handling = ReferenceHandling::IgnoreCycles;
        self
    }

    /// Fail with `CycleDetected` on an ancestor revisit (the default)
    #[must_use]
    pub fn error_on_cycle(mut self) -> Self {
        self.options.reference_handling = ReferenceHandling::ErrorOnCycle;
        self
    }

    /// Set the cycle-handling policy explicitly
    #[must_use]
    pub fn reference_handling(mut self, handling: ReferenceHandling) -> Self {
        self.options.reference_handling = handling;
        self
    }

    /// Enable debug logging for this operation
    #[must_use]
    pub fn debug(mut self) -> Self {
        self.debug_enabled = true;
        self
    }

    /// Serialize a graph to UTF-8 JSON bytes
    pub fn to_vec(&self, root: &GraphValue) -> JsonResult<Vec<u8>> {
        let bytes = GraphSerializer::new(self.options.clone()).serialize(root)?;
        if self.debug_enabled {
            tracing::debug!(
                target: "refson::builder",
                bytes = bytes.len(),
                policy = ?self.options.reference_handling,
                "serialize completed"
            );
        }
        Ok(bytes)
    }

    /// Serialize a graph to a JSON string
    pub fn to_string(&self, root: &GraphValue) -> JsonResult<String> {
        String::from_utf8(self.to_vec(root)?)
            .map_err(|_| JsonError::malformed(0, "serializer produced invalid UTF-8"))
    }
}

/// Fluent configuration for a deserialize operation
#[derive(Debug, Clone, Default)]
pub struct DeserializerBuilder {
    options: JsonOptions,
    debug_enabled: bool,
}

impl DeserializerBuilder {
    /// Start building with default options (depth 64)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the inclusive maximum nesting depth
    #[must_use]
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.options.max_depth = max_depth;
        self
    }

    /// Enable debug logging for this operation
    #[must_use]
    pub fn debug(mut self) -> Self {
        self.debug_enabled = true;
        self
    }

    /// Parse a reference-preserving JSON document into a graph
    pub fn from_slice(&self, input: &[u8]) -> JsonResult<GraphValue> {
        let value = refson_core::from_slice(input, &self.options)?;
        if self.debug_enabled {
            tracing::debug!(
                target: "refson::builder",
                bytes = input.len(),
                "deserialize completed"
            );
        }
        Ok(value)
    }

    /// Parse a reference-preserving JSON string into a graph
    pub fn from_str(&self, input: &str) -> JsonResult<GraphValue> {
        self.from_slice(input.as_bytes())
    }
}
