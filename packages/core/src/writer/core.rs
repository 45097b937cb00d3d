//! Cycle-aware object-graph serializer
//!
//! Walks a shared object graph and decides, per reference-typed node, how
//! its repeat occurrences are represented: preserved as `$id`/`$ref`
//! envelopes, silently omitted when the repeat is an ancestor on the
//! active path, or reported as a cycle error. The resolver's id table is
//! whole-document and never popped; the ancestor set is strictly
//! path-local and unwinds on every exit, including failures.

use hashbrown::HashSet;

use crate::error::{JsonError, JsonResult};
use crate::graph::{ArrayNode, GraphValue, ObjectId, ObjectNode};
use crate::options::{JsonOptions, ReferenceHandling};
use crate::resolver::SerializeResolver;

use super::raw::RawJsonWriter;

/// One-shot serializer for a graph rooted at a single value
///
/// Owns the reference table and ancestor set for exactly one operation.
#[derive(Debug)]
pub struct GraphSerializer {
    options: JsonOptions,
    resolver: SerializeResolver,
    ancestors: HashSet<ObjectId>,
}

impl GraphSerializer {
    /// Create a serializer for one operation under the given options
    #[must_use]
    pub fn new(options: JsonOptions) -> Self {
        Self {
            options,
            resolver: SerializeResolver::new(),
            ancestors: HashSet::new(),
        }
    }

    /// Serialize the graph to UTF-8 JSON bytes
    pub fn serialize(mut self, root: &GraphValue) -> JsonResult<Vec<u8>> {
        let mut writer = RawJsonWriter::new(&self.options);
        self.write_value(root, &mut writer)?;
        writer.finish()
    }

    fn write_value(&mut self, value: &GraphValue, writer: &mut RawJsonWriter) -> JsonResult<()> {
        match value {
            GraphValue::Null => {
                writer.write_null();
                Ok(())
            }
            GraphValue::Bool(flag) => {
                writer.write_bool(*flag);
                Ok(())
            }
            GraphValue::Number(number) => {
                writer.write_number(number);
                Ok(())
            }
            GraphValue::String(text) => {
                writer.write_string(text);
                Ok(())
            }
            GraphValue::Object(node) => match self.options.reference_handling {
                ReferenceHandling::Preserve => self.write_object_preserve(node, writer),
                _ => self.write_object_tracked(node, writer),
            },
            GraphValue::Array(node) => match self.options.reference_handling {
                ReferenceHandling::Preserve => self.write_array_preserve(node, writer),
                _ => self.write_array_tracked(node, writer),
            },
        }
    }

    /// Preserve policy: repeat occurrences become `$ref` envelopes
    fn write_object_preserve(
        &mut self,
        node: &ObjectNode,
        writer: &mut RawJsonWriter,
    ) -> JsonResult<()> {
        let reference = self.resolver.get_or_add(node.identity());
        if reference.already_seen {
            return write_ref_envelope(writer, reference.id);
        }

        writer.write_start_object()?;
        writer.write_property_name("$id");
        writer.write_string(&reference.id.to_string());
        for (name, member) in node.properties().iter() {
            writer.write_property_name(name);
            self.write_value(member, writer)?;
        }
        writer.write_end_object()
    }

    /// Preserve policy for arrays: first sight gets the `$values` wrapper
    /// since a bare array cannot carry a sibling `$id` property
    fn write_array_preserve(
        &mut self,
        node: &ArrayNode,
        writer: &mut RawJsonWriter,
    ) -> JsonResult<()> {
        let reference = self.resolver.get_or_add(node.identity());
        if reference.already_seen {
            return write_ref_envelope(writer, reference.id);
        }

        writer.write_start_object()?;
        writer.write_property_name("$id");
        writer.write_string(&reference.id.to_string());
        writer.write_property_name("$values");
        writer.write_start_array()?;
        for element in node.elements().iter() {
            self.write_value(element, writer)?;
        }
        writer.write_end_array()?;
        writer.write_end_object()
    }

    /// Ignore / error policies: descend with the node on the ancestor set
    fn write_object_tracked(
        &mut self,
        node: &ObjectNode,
        writer: &mut RawJsonWriter,
    ) -> JsonResult<()> {
        let id = node.identity();
        self.ancestors.insert(id);
        let result = self.write_object_members(node, writer);
        self.ancestors.remove(&id);
        result
    }

    fn write_object_members(
        &mut self,
        node: &ObjectNode,
        writer: &mut RawJsonWriter,
    ) -> JsonResult<()> {
        writer.write_start_object()?;
        for (name, member) in node.properties().iter() {
            if self.suppress_ancestor(member)? {
                continue;
            }
            writer.write_property_name(name);
            self.write_value(member, writer)?;
        }
        writer.write_end_object()
    }

    fn write_array_tracked(
        &mut self,
        node: &ArrayNode,
        writer: &mut RawJsonWriter,
    ) -> JsonResult<()> {
        let id = node.identity();
        self.ancestors.insert(id);
        let result = self.write_array_elements(node, writer);
        self.ancestors.remove(&id);
        result
    }

    fn write_array_elements(
        &mut self,
        node: &ArrayNode,
        writer: &mut RawJsonWriter,
    ) -> JsonResult<()> {
        writer.write_start_array()?;
        for element in node.elements().iter() {
            if self.suppress_ancestor(element)? {
                continue;
            }
            self.write_value(element, writer)?;
        }
        writer.write_end_array()
    }

    /// Decide whether a child value is an ancestor revisit and what to do
    ///
    /// Only nodes currently on the active path count; sibling repeats of a
    /// non-ancestor node serialize in full.
    fn suppress_ancestor(&self, value: &GraphValue) -> JsonResult<bool> {
        let Some(id) = value.identity() else {
            return Ok(false);
        };
        if !self.ancestors.contains(&id) {
            return Ok(false);
        }
        match self.options.reference_handling {
            ReferenceHandling::IgnoreCycles => {
                tracing::debug!(
                    target: "refson::writer",
                    "omitting ancestor revisit under ignore-cycles policy"
                );
                Ok(true)
            }
            _ => Err(JsonError::CycleDetected),
        }
    }
}

fn write_ref_envelope(writer: &mut RawJsonWriter, id: u32) -> JsonResult<()> {
    tracing::debug!(target: "refson::writer", id, "emitting $ref envelope");
    writer.write_start_object()?;
    writer.write_property_name("$ref");
    writer.write_string(&id.to_string());
    writer.write_end_object()
}
