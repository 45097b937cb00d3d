//! Shared object-graph value model
//!
//! JSON values whose container nodes are reference-counted handles, so a
//! graph can hold shared sub-objects and cycles the way a managed object
//! graph does. Cloning a handle shares the underlying node; cloning a
//! `GraphValue` is therefore shallow for containers. Node identity is the
//! allocation address behind the handle, and it is what the reference
//! resolver keys on, never structural equality.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use indexmap::IndexMap;
use serde::de::Deserializer;
use serde::ser::Serializer;

use crate::error::{JsonError, JsonResult};

/// Object properties in document order
pub type Properties = IndexMap<String, GraphValue>;

/// Identity of a container node: its allocation address
///
/// Valid while the graph keeps the node alive, which holds for the
/// duration of any single serialize or deserialize operation because the
/// caller's graph is borrowed throughout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(usize);

/// Handle to a shared object node
#[derive(Debug, Clone, Default)]
pub struct ObjectNode {
    inner: Rc<RefCell<Properties>>,
}

impl ObjectNode {
    /// Create an empty object node
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a property (last write wins)
    pub fn insert(&self, name: impl Into<String>, value: GraphValue) {
        self.inner.borrow_mut().insert(name.into(), value);
    }

    /// Look up a property by name, cloning the handle or scalar
    #[must_use]
    pub fn get(&self, name: &str) -> Option<GraphValue> {
        self.inner.borrow().get(name).cloned()
    }

    /// Borrow the ordered property map
    #[must_use]
    pub fn properties(&self) -> Ref<'_, Properties> {
        self.inner.borrow()
    }

    /// Number of properties
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    /// Check if the object has no properties
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }

    /// Identity of this node
    #[inline]
    #[must_use]
    pub fn identity(&self) -> ObjectId {
        ObjectId(Rc::as_ptr(&self.inner) as usize)
    }

    /// Check if two handles share one node
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Handle to a shared array node
#[derive(Debug, Clone, Default)]
pub struct ArrayNode {
    inner: Rc<RefCell<Vec<GraphValue>>>,
}

impl ArrayNode {
    /// Create an empty array node
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an element
    pub fn push(&self, value: GraphValue) {
        self.inner.borrow_mut().push(value);
    }

    /// Look up an element by index, cloning the handle or scalar
    #[must_use]
    pub fn get(&self, index: usize) -> Option<GraphValue> {
        self.inner.borrow().get(index).cloned()
    }

    /// Borrow the element list
    #[must_use]
    pub fn elements(&self) -> Ref<'_, Vec<GraphValue>> {
        self.inner.borrow()
    }

    /// Number of elements
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    /// Check if the array has no elements
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }

    /// Identity of this node
    #[inline]
    #[must_use]
    pub fn identity(&self) -> ObjectId {
        ObjectId(Rc::as_ptr(&self.inner) as usize)
    }

    /// Check if two handles share one node
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

/// A JSON value in a shared object graph
#[derive(Debug, Clone)]
pub enum GraphValue {
    /// Null literal
    Null,
    /// Boolean value
    Bool(bool),
    /// Numeric value, preserving integer vs floating formatting
    Number(serde_json::Number),
    /// String value
    String(String),
    /// Shared array node
    Array(ArrayNode),
    /// Shared object node
    Object(ObjectNode),
}

impl GraphValue {
    /// Create a fresh empty object value
    #[must_use]
    pub fn object() -> Self {
        GraphValue::Object(ObjectNode::new())
    }

    /// Create a fresh empty array value
    #[must_use]
    pub fn array() -> Self {
        GraphValue::Array(ArrayNode::new())
    }

    /// Create a floating-point number value
    ///
    /// Returns `None` for non-finite inputs, which JSON cannot represent.
    #[must_use]
    pub fn from_f64(value: f64) -> Option<Self> {
        serde_json::Number::from_f64(value).map(GraphValue::Number)
    }

    /// Identity of the underlying node for reference-typed values
    #[inline]
    #[must_use]
    pub fn identity(&self) -> Option<ObjectId> {
        match self {
            GraphValue::Array(node) => Some(node.identity()),
            GraphValue::Object(node) => Some(node.identity()),
            _ => None,
        }
    }

    /// Check if the value is a container with identity
    #[inline]
    #[must_use]
    pub fn is_reference_type(&self) -> bool {
        matches!(self, GraphValue::Array(_) | GraphValue::Object(_))
    }

    /// Build a graph from a parsed `serde_json` tree
    ///
    /// The result contains fresh nodes throughout; `serde_json` trees
    /// cannot express sharing, so none is reconstructed.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => GraphValue::Null,
            serde_json::Value::Bool(flag) => GraphValue::Bool(*flag),
            serde_json::Value::Number(number) => GraphValue::Number(number.clone()),
            serde_json::Value::String(text) => GraphValue::String(text.clone()),
            serde_json::Value::Array(items) => {
                let node = ArrayNode::new();
                for item in items {
                    node.push(GraphValue::from_json(item));
                }
                GraphValue::Array(node)
            }
            serde_json::Value::Object(members) => {
                let node = ObjectNode::new();
                for (name, member) in members {
                    node.insert(name.clone(), GraphValue::from_json(member));
                }
                GraphValue::Object(node)
            }
        }
    }

    /// Convert to a `serde_json` tree
    ///
    /// Shared acyclic nodes are duplicated, since a tree cannot express
    /// sharing. Cyclic graphs fail with [`JsonError::CycleDetected`].
    pub fn to_json(&self) -> JsonResult<serde_json::Value> {
        let mut ancestors = hashbrown::HashSet::new();
        self.to_json_inner(&mut ancestors)
    }

    fn to_json_inner(
        &self,
        ancestors: &mut hashbrown::HashSet<ObjectId>,
    ) -> JsonResult<serde_json::Value> {
        match self {
            GraphValue::Null => Ok(serde_json::Value::Null),
            GraphValue::Bool(flag) => Ok(serde_json::Value::Bool(*flag)),
            GraphValue::Number(number) => Ok(serde_json::Value::Number(number.clone())),
            GraphValue::String(text) => Ok(serde_json::Value::String(text.clone())),
            GraphValue::Array(node) => {
                let id = node.identity();
                if !ancestors.insert(id) {
                    return Err(JsonError::CycleDetected);
                }
                let result = node
                    .elements()
                    .iter()
                    .map(|element| element.to_json_inner(ancestors))
                    .collect::<JsonResult<Vec<_>>>()
                    .map(serde_json::Value::Array);
                ancestors.remove(&id);
                result
            }
            GraphValue::Object(node) => {
                let id = node.identity();
                if !ancestors.insert(id) {
                    return Err(JsonError::CycleDetected);
                }
                let result = node
                    .properties()
                    .iter()
                    .map(|(name, member)| {
                        Ok((name.clone(), member.to_json_inner(ancestors)?))
                    })
                    .collect::<JsonResult<serde_json::Map<_, _>>>()
                    .map(serde_json::Value::Object);
                ancestors.remove(&id);
                result
            }
        }
    }
}

impl From<bool> for GraphValue {
    fn from(value: bool) -> Self {
        GraphValue::Bool(value)
    }
}

impl From<i64> for GraphValue {
    fn from(value: i64) -> Self {
        GraphValue::Number(serde_json::Number::from(value))
    }
}

impl From<u64> for GraphValue {
    fn from(value: u64) -> Self {
        GraphValue::Number(serde_json::Number::from(value))
    }
}

impl From<&str> for GraphValue {
    fn from(value: &str) -> Self {
        GraphValue::String(value.to_string())
    }
}

impl From<String> for GraphValue {
    fn from(value: String) -> Self {
        GraphValue::String(value)
    }
}

impl From<ObjectNode> for GraphValue {
    fn from(node: ObjectNode) -> Self {
        GraphValue::Object(node)
    }
}

impl From<ArrayNode> for GraphValue {
    fn from(node: ArrayNode) -> Self {
        GraphValue::Array(node)
    }
}

impl serde::Serialize for GraphValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> serde::Deserialize<'de> for GraphValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(GraphValue::from_json(&value))
    }
}
