//! Reference resolution tables
//!
//! One resolver instance exists per top-level serialize or deserialize
//! operation and is discarded when that operation completes. The two
//! directions are separate types, so an instance can never hold the wrong
//! table: serialization maps node identity to a dense numeric id,
//! deserialization maps an id string back to the constructed node.

use hashbrown::HashMap;

use crate::error::{JsonError, JsonResult};
use crate::graph::{GraphValue, ObjectId};

/// Outcome of a serialize-mode identity lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    /// The node's reference id; first assignment is 1
    pub id: u32,
    /// Whether the node had already been observed in this operation
    pub already_seen: bool,
}

/// Serialize-mode resolver: node identity to reference id
///
/// Identity comparison is pointer identity of the underlying node
/// allocation. Two structurally equal but distinct nodes always receive
/// distinct ids. Ids are dense, strictly increasing from 1, and never
/// reused within an operation.
#[derive(Debug, Default)]
pub struct SerializeResolver {
    reference_count: u32,
    object_to_id: HashMap<ObjectId, u32>,
}

impl SerializeResolver {
    /// Create an empty serialize-mode resolver
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the id for a node identity, assigning the next id on first sight
    pub fn get_or_add(&mut self, identity: ObjectId) -> Reference {
        if let Some(&id) = self.object_to_id.get(&identity) {
            return Reference {
                id,
                already_seen: true,
            };
        }
        self.reference_count += 1;
        let id = self.reference_count;
        self.object_to_id.insert(identity, id);
        Reference {
            id,
            already_seen: false,
        }
    }

    /// Number of distinct nodes observed so far
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.object_to_id.len()
    }

    /// Check if no node has been observed yet
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.object_to_id.is_empty()
    }
}

/// Deserialize-mode resolver: id string to constructed node
#[derive(Debug, Default)]
pub struct DeserializeResolver {
    id_to_object: HashMap<String, GraphValue>,
}

impl DeserializeResolver {
    /// Create an empty deserialize-mode resolver
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node under the id read from an `$id` property
    ///
    /// Fails with [`JsonError::DuplicateId`] if the id is already taken;
    /// a colliding id signals a corrupt or adversarial document and is
    /// never silently overwritten.
    pub fn register(&mut self, id: impl Into<String>, value: GraphValue) -> JsonResult<()> {
        let id = id.into();
        match self.id_to_object.entry(id) {
            hashbrown::hash_map::Entry::Occupied(entry) => {
                Err(JsonError::duplicate_id(entry.key().clone()))
            }
            hashbrown::hash_map::Entry::Vacant(entry) => {
                entry.insert(value);
                Ok(())
            }
        }
    }

    /// Resolve the node registered under the id read from a `$ref`
    ///
    /// Registration follows document order, so a legal reference is
    /// always behind the cursor; failure means the document points at an
    /// id that never existed.
    pub fn resolve(&self, id: &str) -> JsonResult<GraphValue> {
        self.id_to_object
            .get(id)
            .cloned()
            .ok_or_else(|| JsonError::unknown_reference(id))
    }

    /// Number of registered ids
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.id_to_object.len()
    }

    /// Check if no id has been registered yet
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.id_to_object.is_empty()
    }
}
