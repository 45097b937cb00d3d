//! Depth-tracking token reader
//!
//! A forward-only cursor over an in-memory JSON document. The reader
//! exposes token payloads as spans into the borrowed input buffer and
//! never allocates for them; nesting is tracked on a scope stack checked
//! against the configured bound on every structural open.

use crate::error::{JsonError, JsonResult};
use crate::options::JsonOptions;

use super::numbers::scan_number;
use super::strings::scan_string;
use super::tokens::{JsonTokenKind, TokenSpan};

/// Object or array scope currently open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Object,
    Array,
}

/// What the reader expects at its current position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReaderState {
    /// Before the top-level value
    Start,
    /// After `{`: a property name or `}`
    FirstName,
    /// After a comma inside an object: a property name
    NextName,
    /// After a property name's colon: a value
    MemberValue,
    /// After `[`: a value or `]`
    FirstElement,
    /// After a comma inside an array: a value
    NextElement,
    /// After a complete value inside a container: `,` or the close
    AfterValue,
    /// After the top-level value: end of input only
    End,
}

/// Zero-copy JSON token reader with depth enforcement
///
/// One reader is constructed per input buffer and advanced by one caller;
/// a failed read poisons the reader and every later `advance` re-reports
/// the original error.
#[derive(Debug)]
pub struct JsonTokenReader<'a> {
    input: &'a [u8],
    pos: usize,
    scopes: Vec<Scope>,
    max_depth: usize,
    state: ReaderState,
    token: JsonTokenKind,
    span: TokenSpan,
    failed: Option<JsonError>,
}

impl<'a> JsonTokenReader<'a> {
    /// Create a reader over `input` with the configured depth bound
    #[must_use]
    pub fn new(input: &'a [u8], options: &JsonOptions) -> Self {
        Self {
            input,
            pos: 0,
            scopes: Vec::new(),
            max_depth: options.max_depth,
            state: ReaderState::Start,
            token: JsonTokenKind::None,
            span: TokenSpan::default(),
            failed: None,
        }
    }

    /// Consume the next token
    ///
    /// Returns `Ok(Some(kind))` for each token and `Ok(None)` once the
    /// input is cleanly exhausted.
    pub fn advance(&mut self) -> JsonResult<Option<JsonTokenKind>> {
        if let Some(error) = &self.failed {
            return Err(error.clone());
        }
        match self.next_token() {
            Ok(kind) => Ok(kind),
            Err(error) => {
                self.failed = Some(error.clone());
                Err(error)
            }
        }
    }

    fn next_token(&mut self) -> JsonResult<Option<JsonTokenKind>> {
        self.skip_whitespace();

        if self.pos >= self.input.len() {
            return match self.state {
                ReaderState::Start | ReaderState::End => Ok(None),
                _ => Err(JsonError::malformed(self.pos, "unexpected end of input")),
            };
        }

        let byte = self.input[self.pos];
        match self.state {
            ReaderState::Start
            | ReaderState::MemberValue
            | ReaderState::FirstElement
            | ReaderState::NextElement => self.read_value(byte),
            ReaderState::FirstName => match byte {
                b'"' => self.read_property_name(),
                b'}' => self.close_scope(Scope::Object, JsonTokenKind::EndObject),
                _ => Err(self.unexpected(byte, "property name or '}'")),
            },
            ReaderState::NextName => match byte {
                b'"' => self.read_property_name(),
                _ => Err(self.unexpected(byte, "property name")),
            },
            ReaderState::AfterValue => match byte {
                b',' => {
                    self.pos += 1;
                    self.state = match self.scopes.last() {
                        Some(Scope::Object) => ReaderState::NextName,
                        Some(Scope::Array) => ReaderState::NextElement,
                        None => {
                            return Err(JsonError::malformed(
                                self.pos - 1,
                                "separator outside any container",
                            ));
                        }
                    };
                    self.next_token()
                }
                b'}' => self.close_scope(Scope::Object, JsonTokenKind::EndObject),
                b']' => self.close_scope(Scope::Array, JsonTokenKind::EndArray),
                _ => Err(self.unexpected(byte, "',' or a closing bracket")),
            },
            ReaderState::End => Err(JsonError::malformed(
                self.pos,
                "trailing characters after top-level value",
            )),
        }
    }

    fn read_value(&mut self, byte: u8) -> JsonResult<Option<JsonTokenKind>> {
        match byte {
            b'{' => self.open_scope(Scope::Object, JsonTokenKind::StartObject),
            b'[' => self.open_scope(Scope::Array, JsonTokenKind::StartArray),
            b']' if self.state == ReaderState::FirstElement => {
                self.close_scope(Scope::Array, JsonTokenKind::EndArray)
            }
            b'"' => {
                let payload = self.pos + 1;
                let closing = scan_string(self.input, payload)?;
                self.span = TokenSpan::new(payload, closing - payload);
                self.pos = closing + 1;
                self.finish_value(JsonTokenKind::String)
            }
            b'-' | b'0'..=b'9' => {
                let start = self.pos;
                let end = scan_number(self.input, start)?;
                self.span = TokenSpan::new(start, end - start);
                self.pos = end;
                self.finish_value(JsonTokenKind::Number)
            }
            b't' => self.read_literal(b"true", JsonTokenKind::True),
            b'f' => self.read_literal(b"false", JsonTokenKind::False),
            b'n' => self.read_literal(b"null", JsonTokenKind::Null),
            _ => Err(self.unexpected(byte, "a JSON value")),
        }
    }

    fn read_property_name(&mut self) -> JsonResult<Option<JsonTokenKind>> {
        let payload = self.pos + 1;
        let closing = scan_string(self.input, payload)?;
        self.span = TokenSpan::new(payload, closing - payload);
        self.pos = closing + 1;

        // The colon belongs to the name token
        self.skip_whitespace();
        if self.pos >= self.input.len() || self.input[self.pos] != b':' {
            return Err(JsonError::malformed(self.pos, "expected ':' after property name"));
        }
        self.pos += 1;

        self.state = ReaderState::MemberValue;
        self.token = JsonTokenKind::PropertyName;
        Ok(Some(JsonTokenKind::PropertyName))
    }

    fn read_literal(
        &mut self,
        literal: &'static [u8],
        kind: JsonTokenKind,
    ) -> JsonResult<Option<JsonTokenKind>> {
        let start = self.pos;
        let end = start + literal.len();
        if self.input.len() < end || &self.input[start..end] != literal {
            return Err(JsonError::malformed(start, "invalid literal"));
        }
        self.span = TokenSpan::new(start, literal.len());
        self.pos = end;
        self.finish_value(kind)
    }

    fn open_scope(
        &mut self,
        scope: Scope,
        kind: JsonTokenKind,
    ) -> JsonResult<Option<JsonTokenKind>> {
        if self.scopes.len() >= self.max_depth {
            return Err(JsonError::depth_exceeded(self.max_depth, self.pos));
        }
        self.scopes.push(scope);
        self.span = TokenSpan::new(self.pos, 1);
        self.pos += 1;
        self.state = match scope {
            Scope::Object => ReaderState::FirstName,
            Scope::Array => ReaderState::FirstElement,
        };
        self.token = kind;
        Ok(Some(kind))
    }

    fn close_scope(
        &mut self,
        expected: Scope,
        kind: JsonTokenKind,
    ) -> JsonResult<Option<JsonTokenKind>> {
        match self.scopes.pop() {
            Some(open) if open == expected => {}
            Some(_) => {
                return Err(JsonError::malformed(self.pos, "mismatched closing bracket"));
            }
            None => {
                return Err(JsonError::malformed(
                    self.pos,
                    "closing bracket without matching open",
                ));
            }
        }
        self.span = TokenSpan::new(self.pos, 1);
        self.pos += 1;
        self.state = if self.scopes.is_empty() {
            ReaderState::End
        } else {
            ReaderState::AfterValue
        };
        self.token = kind;
        Ok(Some(kind))
    }

    fn finish_value(&mut self, kind: JsonTokenKind) -> JsonResult<Option<JsonTokenKind>> {
        self.state = if self.scopes.is_empty() {
            ReaderState::End
        } else {
            ReaderState::AfterValue
        };
        self.token = kind;
        Ok(Some(kind))
    }

    #[inline]
    fn skip_whitespace(&mut self) {
        while self.pos < self.input.len()
            && matches!(self.input[self.pos], b' ' | b'\t' | b'\n' | b'\r')
        {
            self.pos += 1;
        }
    }

    fn unexpected(&self, byte: u8, expected: &str) -> JsonError {
        JsonError::malformed(
            self.pos,
            format!("unexpected byte '{}', expected {expected}", byte as char),
        )
    }

    /// Kind of the most recently read token
    #[inline]
    #[must_use]
    pub fn token_kind(&self) -> JsonTokenKind {
        self.token
    }

    /// Span of the current token's payload inside the input
    #[inline]
    #[must_use]
    pub fn token_span(&self) -> TokenSpan {
        self.span
    }

    /// Raw payload bytes of the current token
    #[inline]
    #[must_use]
    pub fn token_bytes(&self) -> &'a [u8] {
        &self.input[self.span.offset..self.span.end()]
    }

    /// Current token payload as UTF-8 text
    ///
    /// Escape sequences are left unresolved; see [`super::strings::unescape`].
    pub fn token_str(&self) -> JsonResult<&'a str> {
        simdutf8::basic::from_utf8(self.token_bytes())
            .map_err(|_| JsonError::malformed(self.span.offset, "invalid UTF-8 in token"))
    }

    /// Current nesting depth
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Current cursor position in bytes
    #[inline]
    #[must_use]
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// Check if the cursor has consumed the whole buffer
    #[inline]
    #[must_use]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }
}
