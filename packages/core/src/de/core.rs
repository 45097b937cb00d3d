//! Envelope-aware graph deserializer
//!
//! Rebuilds a shared object graph from reference-preserving JSON. Every
//! property name runs through the metadata classifier; `$id` envelopes
//! register their node with the resolver *before* the node's content is
//! parsed, so `$ref`s anywhere later in the document (including inside
//! the node itself) resolve to the same handle.

use std::borrow::Cow;

use crate::error::{JsonError, JsonResult};
use crate::graph::{ArrayNode, GraphValue, ObjectNode};
use crate::metadata::{MetadataPropertyName, classify};
use crate::options::JsonOptions;
use crate::reader::{JsonTokenKind, JsonTokenReader, unescape};
use crate::resolver::DeserializeResolver;

/// Parse a reference-preserving JSON document into a graph
pub fn from_slice(input: &[u8], options: &JsonOptions) -> JsonResult<GraphValue> {
    GraphDeserializer::new(input, options).deserialize()
}

/// One-shot deserializer composing the token reader, the metadata
/// classifier and a deserialize-mode resolver
#[derive(Debug)]
pub struct GraphDeserializer<'a> {
    reader: JsonTokenReader<'a>,
    resolver: DeserializeResolver,
}

impl<'a> GraphDeserializer<'a> {
    /// Create a deserializer over `input`
    #[must_use]
    pub fn new(input: &'a [u8], options: &JsonOptions) -> Self {
        Self {
            reader: JsonTokenReader::new(input, options),
            resolver: DeserializeResolver::new(),
        }
    }

    /// Consume the input and build the graph
    pub fn deserialize(mut self) -> JsonResult<GraphValue> {
        let Some(kind) = self.reader.advance()? else {
            return Err(JsonError::malformed(0, "empty JSON document"));
        };
        let value = self.parse_value(kind)?;
        if self.reader.advance()?.is_some() {
            return Err(JsonError::malformed(
                self.reader.offset(),
                "trailing characters after top-level value",
            ));
        }
        Ok(value)
    }

    fn parse_value(&mut self, kind: JsonTokenKind) -> JsonResult<GraphValue> {
        match kind {
            JsonTokenKind::String => Ok(GraphValue::String(self.token_text()?)),
            JsonTokenKind::Number => self.parse_number(),
            JsonTokenKind::True => Ok(GraphValue::Bool(true)),
            JsonTokenKind::False => Ok(GraphValue::Bool(false)),
            JsonTokenKind::Null => Ok(GraphValue::Null),
            JsonTokenKind::StartArray => {
                let node = ArrayNode::new();
                self.fill_array(&node)?;
                Ok(GraphValue::Array(node))
            }
            JsonTokenKind::StartObject => self.parse_object(),
            other => Err(self.unexpected_token(other)),
        }
    }

    fn parse_object(&mut self) -> JsonResult<GraphValue> {
        let kind = self.require_token()?;
        if kind == JsonTokenKind::EndObject {
            return Ok(GraphValue::object());
        }

        let name_offset = self.reader.token_span().offset;
        match classify(self.reader.token_bytes()) {
            MetadataPropertyName::Id => self.parse_id_envelope(),
            MetadataPropertyName::Ref => self.parse_ref_envelope(),
            MetadataPropertyName::Values => Err(JsonError::malformed(
                name_offset,
                "$values requires a preceding $id",
            )),
            MetadataPropertyName::NoMetadata => {
                let node = ObjectNode::new();
                self.fill_object_members(&node)?;
                Ok(GraphValue::Object(node))
            }
        }
    }

    /// Parse the remainder of an object whose current token is an
    /// ordinary property name
    fn fill_object_members(&mut self, node: &ObjectNode) -> JsonResult<()> {
        loop {
            let offset = self.reader.token_span().offset;
            if classify(self.reader.token_bytes()) != MetadataPropertyName::NoMetadata {
                return Err(JsonError::malformed(
                    offset,
                    format!(
                        "metadata property \"{}\" must begin the object",
                        String::from_utf8_lossy(self.reader.token_bytes())
                    ),
                ));
            }
            let name = self.token_text()?;
            let kind = self.require_token()?;
            let member = self.parse_value(kind)?;
            node.insert(name, member);

            match self.require_token()? {
                JsonTokenKind::PropertyName => {}
                JsonTokenKind::EndObject => return Ok(()),
                other => return Err(self.unexpected_token(other)),
            }
        }
    }

    /// Parse elements until the matching `]`; the opening `[` is already
    /// consumed
    fn fill_array(&mut self, node: &ArrayNode) -> JsonResult<()> {
        loop {
            let kind = self.require_token()?;
            if kind == JsonTokenKind::EndArray {
                return Ok(());
            }
            let element = self.parse_value(kind)?;
            node.push(element);
        }
    }

    /// Parse an object that opened with `$id`
    fn parse_id_envelope(&mut self) -> JsonResult<GraphValue> {
        let id = self.metadata_string("$id")?;
        tracing::debug!(target: "refson::de", id = %id, "registering $id envelope");

        match self.require_token()? {
            JsonTokenKind::EndObject => {
                // An envelope with no content is still a referenceable object
                let value = GraphValue::object();
                self.resolver.register(id, value.clone())?;
                Ok(value)
            }
            JsonTokenKind::PropertyName => match classify(self.reader.token_bytes()) {
                MetadataPropertyName::Values => {
                    let node = ArrayNode::new();
                    let value = GraphValue::Array(node.clone());
                    self.resolver.register(id, value.clone())?;

                    match self.require_token()? {
                        JsonTokenKind::StartArray => self.fill_array(&node)?,
                        _ => {
                            return Err(JsonError::malformed(
                                self.reader.token_span().offset,
                                "$values must hold an array",
                            ));
                        }
                    }
                    match self.require_token()? {
                        JsonTokenKind::EndObject => Ok(value),
                        _ => Err(JsonError::malformed(
                            self.reader.token_span().offset,
                            "properties are not allowed after $values",
                        )),
                    }
                }
                MetadataPropertyName::NoMetadata => {
                    let node = ObjectNode::new();
                    let value = GraphValue::Object(node.clone());
                    self.resolver.register(id, value.clone())?;
                    self.fill_object_members(&node)?;
                    Ok(value)
                }
                _ => Err(JsonError::malformed(
                    self.reader.token_span().offset,
                    "unexpected metadata property after $id",
                )),
            },
            other => Err(self.unexpected_token(other)),
        }
    }

    /// Parse an object that opened with `$ref`
    fn parse_ref_envelope(&mut self) -> JsonResult<GraphValue> {
        let id = self.metadata_string("$ref")?;

        match self.require_token()? {
            JsonTokenKind::EndObject => {
                tracing::debug!(target: "refson::de", id = %id, "resolving $ref envelope");
                self.resolver.resolve(&id)
            }
            JsonTokenKind::PropertyName => Err(JsonError::malformed(
                self.reader.token_span().offset,
                "$ref must be the only property",
            )),
            other => Err(self.unexpected_token(other)),
        }
    }

    /// Read a metadata property's value, which must be a string
    fn metadata_string(&mut self, name: &str) -> JsonResult<String> {
        match self.require_token()? {
            JsonTokenKind::String => self.token_text(),
            _ => Err(JsonError::malformed(
                self.reader.token_span().offset,
                format!("{name} value must be a string"),
            )),
        }
    }

    fn parse_number(&mut self) -> JsonResult<GraphValue> {
        let offset = self.reader.token_span().offset;
        let number = self
            .reader
            .token_str()?
            .parse::<serde_json::Number>()
            .map_err(|_| JsonError::malformed(offset, "unrepresentable number"))?;
        Ok(GraphValue::Number(number))
    }

    fn token_text(&mut self) -> JsonResult<String> {
        let span = self.reader.token_span();
        unescape(self.reader.token_bytes(), span.offset).map(Cow::into_owned)
    }

    fn require_token(&mut self) -> JsonResult<JsonTokenKind> {
        self.reader.advance()?.ok_or_else(|| {
            JsonError::malformed(self.reader.offset(), "unexpected end of input")
        })
    }

    fn unexpected_token(&self, kind: JsonTokenKind) -> JsonError {
        JsonError::malformed(
            self.reader.token_span().offset,
            format!("unexpected token {}", kind.as_debug_str()),
        )
    }
}
