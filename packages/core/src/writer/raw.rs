//! Raw UTF-8 JSON token writer
//!
//! Emits structural and scalar tokens into an owned byte buffer, inserting
//! separators automatically and escaping string payloads. The writer
//! tracks nesting on the same kind of scope stack as the reader and
//! enforces the same inclusive depth bound, so documents it produces read
//! back under an identically configured reader.

use crate::error::{JsonError, JsonResult};
use crate::options::JsonOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Object,
    Array,
}

/// Forward-only JSON token emitter with depth enforcement
#[derive(Debug)]
pub struct RawJsonWriter {
    buf: Vec<u8>,
    scopes: Vec<Container>,
    max_depth: usize,
    needs_separator: bool,
}

impl RawJsonWriter {
    /// Create a writer honoring the configured depth bound
    #[must_use]
    pub fn new(options: &JsonOptions) -> Self {
        Self {
            buf: Vec::new(),
            scopes: Vec::new(),
            max_depth: options.max_depth,
            needs_separator: false,
        }
    }

    /// Emit `{`
    pub fn write_start_object(&mut self) -> JsonResult<()> {
        self.open(Container::Object, b'{')
    }

    /// Emit `}`
    pub fn write_end_object(&mut self) -> JsonResult<()> {
        self.close(Container::Object, b'}')
    }

    /// Emit `[`
    pub fn write_start_array(&mut self) -> JsonResult<()> {
        self.open(Container::Array, b'[')
    }

    /// Emit `]`
    pub fn write_end_array(&mut self) -> JsonResult<()> {
        self.close(Container::Array, b']')
    }

    /// Emit a property name and its colon
    pub fn write_property_name(&mut self, name: &str) {
        self.separate();
        self.write_quoted(name);
        self.buf.push(b':');
        self.needs_separator = false;
    }

    /// Emit a string value
    pub fn write_string(&mut self, value: &str) {
        self.separate();
        self.write_quoted(value);
        self.needs_separator = true;
    }

    /// Emit a number value
    pub fn write_number(&mut self, value: &serde_json::Number) {
        self.separate();
        self.buf.extend_from_slice(value.to_string().as_bytes());
        self.needs_separator = true;
    }

    /// Emit a boolean value
    pub fn write_bool(&mut self, value: bool) {
        self.separate();
        let literal: &[u8] = if value { b"true" } else { b"false" };
        self.buf.extend_from_slice(literal);
        self.needs_separator = true;
    }

    /// Emit a null value
    pub fn write_null(&mut self) {
        self.separate();
        self.buf.extend_from_slice(b"null");
        self.needs_separator = true;
    }

    /// Finish writing and take the emitted bytes
    ///
    /// Fails if any container is still open.
    pub fn finish(self) -> JsonResult<Vec<u8>> {
        if !self.scopes.is_empty() {
            return Err(JsonError::malformed(
                self.buf.len(),
                "document finished with unclosed containers",
            ));
        }
        Ok(self.buf)
    }

    /// Bytes emitted so far
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Current nesting depth
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    fn open(&mut self, container: Container, byte: u8) -> JsonResult<()> {
        if self.scopes.len() >= self.max_depth {
            return Err(JsonError::depth_exceeded(self.max_depth, self.buf.len()));
        }
        self.separate();
        self.scopes.push(container);
        self.buf.push(byte);
        self.needs_separator = false;
        Ok(())
    }

    fn close(&mut self, container: Container, byte: u8) -> JsonResult<()> {
        match self.scopes.pop() {
            Some(open) if open == container => {}
            Some(_) => {
                return Err(JsonError::malformed(self.buf.len(), "mismatched container close"));
            }
            None => {
                return Err(JsonError::malformed(self.buf.len(), "close without open container"));
            }
        }
        self.buf.push(byte);
        self.needs_separator = true;
        Ok(())
    }

    #[inline]
    fn separate(&mut self) {
        if self.needs_separator {
            self.buf.push(b',');
        }
    }

    fn write_quoted(&mut self, text: &str) {
        self.buf.push(b'"');
        let bytes = text.as_bytes();
        let mut start = 0;
        for (index, &byte) in bytes.iter().enumerate() {
            let escape: Option<&[u8]> = match byte {
                b'"' => Some(b"\\\""),
                b'\\' => Some(b"\\\\"),
                0x08 => Some(b"\\b"),
                0x0C => Some(b"\\f"),
                b'\n' => Some(b"\\n"),
                b'\r' => Some(b"\\r"),
                b'\t' => Some(b"\\t"),
                _ => None,
            };
            if let Some(sequence) = escape {
                self.buf.extend_from_slice(&bytes[start..index]);
                self.buf.extend_from_slice(sequence);
                start = index + 1;
            } else if byte < 0x20 {
                self.buf.extend_from_slice(&bytes[start..index]);
                self.buf.extend_from_slice(b"\\u00");
                self.buf.push(HEX_DIGITS[usize::from(byte >> 4)]);
                self.buf.push(HEX_DIGITS[usize::from(byte & 0x0F)]);
                start = index + 1;
            }
        }
        self.buf.extend_from_slice(&bytes[start..]);
        self.buf.push(b'"');
    }
}

const HEX_DIGITS: [u8; 16] = *b"0123456789abcdef";

#[cfg(test)]
mod tests {
    use super::RawJsonWriter;
    use crate::options::JsonOptions;

    #[test]
    fn test_emits_separators_and_escapes() {
        let options = JsonOptions::default();
        let mut writer = RawJsonWriter::new(&options);
        writer.write_start_object().expect("open");
        writer.write_property_name("a\"b");
        writer.write_string("line\nbreak");
        writer.write_property_name("n");
        writer.write_number(&serde_json::Number::from(7));
        writer.write_end_object().expect("close");
        let bytes = writer.finish().expect("balanced");
        assert_eq!(bytes, br#"{"a\"b":"line\nbreak","n":7}"#);
    }

    #[test]
    fn test_depth_bound_matches_reader() {
        let options = JsonOptions::default().max_depth(2);
        let mut writer = RawJsonWriter::new(&options);
        writer.write_start_array().expect("depth 1");
        writer.write_start_array().expect("depth 2");
        assert!(writer.write_start_array().is_err());
    }

    #[test]
    fn test_finish_rejects_unclosed_scopes() {
        let options = JsonOptions::default();
        let mut writer = RawJsonWriter::new(&options);
        writer.write_start_object().expect("open");
        assert!(writer.finish().is_err());
    }
}
