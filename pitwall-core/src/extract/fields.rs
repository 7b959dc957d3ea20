//! Minimal top-level field scan over one object span
//!
//! Enough JSON to pull scalar fields out of a candidate record: keys are
//! compared as raw bytes, nested values are skipped without inspection.

use heapless::String;

use crate::error::ParseError;

/// A top-level value, borrowed from the object span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawValue<'a> {
    Null,
    Bool(bool),
    /// Number token, unvalidated beyond its character set
    Number(&'a str),
    /// String contents between the quotes, still escaped
    Str(&'a [u8]),
    /// Object or array, including its brackets
    Composite(&'a [u8]),
}

impl RawValue<'_> {
    pub fn is_null(&self) -> bool {
        matches!(self, RawValue::Null)
    }
}

/// Iterator over `(raw key, value)` pairs of an object span
///
/// Yields an error and then stops if the span is malformed.
pub struct Fields<'a> {
    buf: &'a [u8],
    pos: usize,
    done: bool,
}

impl<'a> Fields<'a> {
    pub fn new(object: &'a [u8]) -> Self {
        let mut fields = Self {
            buf: object,
            pos: 0,
            done: false,
        };
        fields.skip_ws();
        if fields.peek() == Some(b'{') {
            fields.pos += 1;
        } else {
            fields.pos = usize::MAX;
        }
        fields
    }

    fn peek(&self) -> Option<u8> {
        self.buf.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, byte: u8) -> Result<(), ParseError> {
        self.skip_ws();
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(ParseError::UnexpectedShape)
        }
    }

    /// Consume a string literal, returning its escaped contents
    fn string(&mut self) -> Result<&'a [u8], ParseError> {
        self.expect(b'"')?;
        let start = self.pos;
        let mut escaped = false;
        while let Some(b) = self.peek() {
            self.pos += 1;
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                return Ok(&self.buf[start..self.pos - 1]);
            }
        }
        Err(ParseError::UnterminatedString)
    }

    /// Skip a nested object or array
    fn composite(&mut self) -> Result<&'a [u8], ParseError> {
        let start = self.pos;
        let mut depth: u16 = 0;
        let mut in_string = false;
        let mut escaped = false;

        while let Some(b) = self.peek() {
            self.pos += 1;
            if in_string {
                if escaped {
                    escaped = false;
                } else if b == b'\\' {
                    escaped = true;
                } else if b == b'"' {
                    in_string = false;
                }
                continue;
            }
            match b {
                b'"' => in_string = true,
                b'{' | b'[' => depth += 1,
                b'}' | b']' => {
                    depth = depth.checked_sub(1).ok_or(ParseError::MismatchedCloser)?;
                    if depth == 0 {
                        return Ok(&self.buf[start..self.pos]);
                    }
                }
                _ => {}
            }
        }

        if in_string {
            Err(ParseError::UnterminatedString)
        } else {
            Err(ParseError::Unbalanced)
        }
    }

    fn literal(&mut self, word: &[u8]) -> Result<(), ParseError> {
        if self.buf[self.pos..].starts_with(word) {
            self.pos += word.len();
            Ok(())
        } else {
            Err(ParseError::UnexpectedShape)
        }
    }

    fn number(&mut self) -> Result<&'a str, ParseError> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|b| b.is_ascii_digit() || matches!(b, b'-' | b'+' | b'.' | b'e' | b'E'))
        {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(ParseError::UnexpectedShape);
        }
        core::str::from_utf8(&self.buf[start..self.pos]).map_err(|_| ParseError::UnexpectedShape)
    }

    fn value(&mut self) -> Result<RawValue<'a>, ParseError> {
        self.skip_ws();
        match self.peek() {
            Some(b'"') => self.string().map(RawValue::Str),
            Some(b'{') | Some(b'[') => self.composite().map(RawValue::Composite),
            Some(b'n') => self.literal(b"null").map(|_| RawValue::Null),
            Some(b't') => self.literal(b"true").map(|_| RawValue::Bool(true)),
            Some(b'f') => self.literal(b"false").map(|_| RawValue::Bool(false)),
            Some(_) => self.number().map(RawValue::Number),
            None => Err(ParseError::Unbalanced),
        }
    }

    fn field(&mut self) -> Result<Option<(&'a [u8], RawValue<'a>)>, ParseError> {
        if self.pos == usize::MAX {
            return Err(ParseError::UnexpectedShape);
        }

        self.skip_ws();
        if self.peek() == Some(b'}') {
            return Ok(None);
        }

        let key = self.string()?;
        self.expect(b':')?;
        let value = self.value()?;

        self.skip_ws();
        match self.peek() {
            Some(b',') => self.pos += 1,
            Some(b'}') => {}
            Some(_) => return Err(ParseError::UnexpectedShape),
            None => return Err(ParseError::Unbalanced),
        }

        Ok(Some((key, value)))
    }
}

impl<'a> Iterator for Fields<'a> {
    type Item = Result<(&'a [u8], RawValue<'a>), ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.field() {
            Ok(Some(field)) => Some(Ok(field)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Decode escaped string contents into a bounded string
///
/// Stops silently at capacity. Invalid UTF-8 and lone surrogates become
/// `?`.
pub fn unescape_into<const N: usize>(raw: &[u8]) -> String<N> {
    let mut out = String::new();
    let mut rest = raw;

    while !rest.is_empty() {
        let run = rest.iter().position(|&b| b == b'\\').unwrap_or(rest.len());
        let text = core::str::from_utf8(&rest[..run]).unwrap_or("?");
        for c in text.chars() {
            if out.push(c).is_err() {
                return out;
            }
        }
        rest = &rest[run..];

        if rest.is_empty() {
            break;
        }
        let (c, used) = match rest.get(1) {
            Some(b'n') => ('\n', 2),
            Some(b't') => ('\t', 2),
            Some(b'r') => ('\r', 2),
            Some(b'b') => ('\u{8}', 2),
            Some(b'f') => ('\u{c}', 2),
            Some(b'u') => {
                let c = rest
                    .get(2..6)
                    .and_then(|hex| core::str::from_utf8(hex).ok())
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .and_then(char::from_u32)
                    .unwrap_or('?');
                (c, 6.min(rest.len()))
            }
            Some(&other) => (other as char, 2),
            None => break,
        };
        if out.push(c).is_err() {
            return out;
        }
        rest = &rest[used..];
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;

    fn collect(object: &[u8]) -> Result<Vec<(&[u8], RawValue<'_>)>, ParseError> {
        Fields::new(object).collect()
    }

    #[test]
    fn test_scalar_fields() {
        let fields =
            collect(br#"{"a":1.5, "b" : null,"c":"x\"y","d":true,"e":-3e2}"#).unwrap();
        assert_eq!(
            fields,
            [
                (&b"a"[..], RawValue::Number("1.5")),
                (&b"b"[..], RawValue::Null),
                (&b"c"[..], RawValue::Str(br#"x\"y"#)),
                (&b"d"[..], RawValue::Bool(true)),
                (&b"e"[..], RawValue::Number("-3e2")),
            ]
        );
    }

    #[test]
    fn test_nested_values_skipped() {
        let fields = collect(br#"{"n":{"x":[1,{"y":"}"}]},"z":2}"#).unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].1, RawValue::Composite(br#"{"x":[1,{"y":"}"}]}"#));
        assert_eq!(fields[1], (&b"z"[..], RawValue::Number("2")));
    }

    #[test]
    fn test_empty_object() {
        assert_eq!(collect(b"{ }").unwrap().len(), 0);
    }

    #[test]
    fn test_malformed() {
        assert!(collect(br#"{"a" 1}"#).is_err());
        assert!(collect(br#"{"a":1"#).is_err());
        assert!(collect(br#"{"a":"open}"#).is_err());
        assert!(collect(b"[1]").is_err());
        assert!(collect(br#"{"a":nul}"#).is_err());
    }

    #[test]
    fn test_unescape() {
        let s: String<32> = unescape_into(r#"São \"Paulo\"\n"#.as_bytes());
        assert_eq!(s.as_str(), "São \"Paulo\"\n");

        let s: String<4> = unescape_into(b"Monaco");
        assert_eq!(s.as_str(), "Mona");
    }
}
