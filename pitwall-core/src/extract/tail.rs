//! Bounded tail buffer
//!
//! Keeps only the most recent bytes of a JSON body. When the buffer is
//! full the oldest bytes are dropped up to the first record boundary, so
//! the retained bytes always start between two records.
//!
//! Bytes that belong to no record are never stored: the brackets of a
//! top-level array, whitespace between records, and anything after the
//! top-level value has closed.

use heapless::Vec;

use super::scan::Candidates;
use super::TailRecord;
use crate::error::ParseError;

/// Nesting depth of the records inside a bare top-level array
const RECORD_LEVEL: u16 = 1;

/// Top-level shape of the body, decided by its first non-whitespace byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Shape {
    /// Nothing but whitespace seen so far
    Unknown,
    /// A single object
    Object,
    /// An array of records
    Array,
    /// Anything else; the body is not JSON we understand
    Invalid,
}

/// Incremental lexer state: nesting depth and string tracking
#[derive(Debug, Clone, Copy, Default)]
struct Lexer {
    depth: u16,
    in_string: bool,
    escaped: bool,
}

impl Lexer {
    fn at_depth(depth: u16) -> Self {
        Self {
            depth,
            ..Self::default()
        }
    }

    /// Advance over one byte
    ///
    /// Returns true when the byte ends a record: a `,` at record level or
    /// a closer that brings nesting back to record level.
    fn step(&mut self, byte: u8) -> bool {
        if self.in_string {
            if self.escaped {
                self.escaped = false;
            } else if byte == b'\\' {
                self.escaped = true;
            } else if byte == b'"' {
                self.in_string = false;
            }
            return false;
        }

        match byte {
            b'"' => {
                self.in_string = true;
                false
            }
            b'{' | b'[' => {
                self.depth = self.depth.saturating_add(1);
                false
            }
            b'}' | b']' => {
                let closes_record = self.depth == RECORD_LEVEL + 1;
                self.depth = self.depth.saturating_sub(1);
                closes_record
            }
            b',' => self.depth == RECORD_LEVEL,
            _ => false,
        }
    }
}

/// Tail of a JSON body, at most `K` bytes
#[derive(Debug, Clone)]
pub struct TailBuffer<const K: usize> {
    buf: Vec<u8, K>,
    shape: Shape,
    /// Lexer state after the last byte received
    lexer: Lexer,
    /// The top-level value has closed
    finished: bool,
    /// Dropping bytes of a record that did not fit
    discarding: bool,
    /// Some bytes were dropped
    truncated: bool,
}

impl<const K: usize> Default for TailBuffer<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const K: usize> TailBuffer<K> {
    /// Create an empty tail buffer
    pub const fn new() -> Self {
        Self {
            buf: Vec::new(),
            shape: Shape::Unknown,
            lexer: Lexer {
                depth: 0,
                in_string: false,
                escaped: false,
            },
            finished: false,
            discarding: false,
            truncated: false,
        }
    }

    /// Retained bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Number of retained bytes (never more than `K`)
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check if nothing is retained
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Top-level shape seen so far
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Check whether any received bytes were dropped
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Append a chunk
    pub fn extend(&mut self, chunk: &[u8]) {
        for &byte in chunk {
            self.push(byte);
        }
    }

    /// Append a single byte, trimming at a record boundary when full
    pub fn push(&mut self, byte: u8) {
        match self.shape {
            Shape::Unknown => {
                if byte.is_ascii_whitespace() {
                    return;
                }
                self.shape = match byte {
                    b'{' => Shape::Object,
                    b'[' => Shape::Array,
                    _ => Shape::Invalid,
                };
            }
            Shape::Object | Shape::Array | Shape::Invalid => {}
        }
        if self.shape == Shape::Invalid || self.finished {
            return;
        }

        let in_string = self.lexer.in_string;
        let boundary = self.lexer.step(byte);

        if !in_string && self.lexer.depth == 0 {
            self.finished = true;
        }
        if !in_string && self.shape == Shape::Array {
            // Array brackets and separating whitespace carry no record data
            let depth = self.lexer.depth;
            let outer = depth == 0 || (byte == b'[' && depth == RECORD_LEVEL);
            if outer || (byte.is_ascii_whitespace() && depth == RECORD_LEVEL) {
                return;
            }
        }

        if self.discarding {
            if boundary && self.shape == Shape::Array {
                self.discarding = false;
            }
            return;
        }

        if self.buf.is_full() {
            self.make_room();
            if self.discarding {
                // The byte that overflowed may itself end the oversized
                // record
                if boundary && self.shape == Shape::Array {
                    self.discarding = false;
                }
                return;
            }
        }

        // make_room always frees at least one byte or starts discarding
        let _ = self.buf.push(byte);
    }

    /// Drop the oldest record, or everything if no boundary is retained
    fn make_room(&mut self) {
        self.truncated = true;

        if self.shape == Shape::Object {
            // A lone object is never trimmed: any loss makes it unusable
            self.buf.clear();
            self.discarding = true;
            return;
        }

        // The front of an array tail always sits at record level
        let mut lexer = Lexer::at_depth(RECORD_LEVEL);
        let cut = self.buf.iter().position(|&b| lexer.step(b));

        match cut {
            Some(i) => {
                let keep = self.buf.len() - (i + 1);
                self.buf.copy_within(i + 1.., 0);
                self.buf.truncate(keep);
            }
            None => {
                self.buf.clear();
                self.discarding = true;
            }
        }
    }

    /// Find the most recent record accepted by `R`
    ///
    /// An empty body and an overflowed single object yield `Ok(None)`; a
    /// body that is neither an object nor an array is a parse error.
    pub fn latest<R: TailRecord>(&self) -> Result<Option<R>, ParseError> {
        match self.shape {
            Shape::Unknown => Ok(None),
            Shape::Invalid => Err(ParseError::UnexpectedShape),
            Shape::Object => {
                if self.truncated {
                    return Ok(None);
                }
                Ok(Candidates::new(&self.buf).next().and_then(R::from_object))
            }
            Shape::Array => Ok(Candidates::new(&self.buf).find_map(R::from_object)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{LapNumber, LapRecord};

    fn fill<const K: usize>(body: &[u8]) -> TailBuffer<K> {
        let mut tail = TailBuffer::new();
        tail.extend(body);
        tail
    }

    #[test]
    fn test_shape_detection() {
        assert_eq!(fill::<64>(b"  \n[1]").shape(), Shape::Array);
        assert_eq!(fill::<64>(b"{}").shape(), Shape::Object);
        assert_eq!(fill::<64>(b"<html>").shape(), Shape::Invalid);
        assert_eq!(fill::<64>(b"   ").shape(), Shape::Unknown);
        assert!(fill::<64>(b"<html>").is_empty());
    }

    #[test]
    fn test_small_body_kept_whole() {
        let tail = fill::<64>(b"[{\"a\":1}, {\"a\":2}]\n");
        assert_eq!(tail.as_bytes(), b"{\"a\":1},{\"a\":2}");
        assert!(!tail.is_truncated());
    }

    #[test]
    fn test_trims_whole_records() {
        let tail = fill::<20>(b"[{\"a\":1},{\"a\":2},{\"a\":3}]");
        assert!(tail.is_truncated());
        assert!(tail.len() <= 20);
        assert!(tail.as_bytes().ends_with(b"{\"a\":3}"));
        // Front sits between records
        let first = tail.as_bytes().iter().find(|b| !b.is_ascii_whitespace());
        assert!(matches!(first, Some(b',') | Some(b'{')));
    }

    #[test]
    fn test_braces_in_strings_do_not_trim() {
        let tail = fill::<16>(b"[{\"s\":\"},{\"},{\"s\":\"x\"}]");
        assert_eq!(tail.as_bytes(), b",{\"s\":\"x\"}");
    }

    #[test]
    fn test_oversized_record_discarded() {
        let mut body = std::vec::Vec::new();
        body.extend_from_slice(b"[{\"pad\":\"");
        body.extend(core::iter::repeat(b'x').take(100));
        body.extend_from_slice(b"\"},{\"a\":1}]");
        let tail = fill::<32>(&body);
        assert!(tail.is_truncated());
        assert_eq!(tail.as_bytes(), b",{\"a\":1}");
    }

    #[test]
    fn test_object_overflow_yields_nothing() {
        let tail = fill::<16>(b"{\"lap_duration\":91.154,\"driver_number\":44}");
        assert!(tail.is_truncated());
        assert_eq!(tail.latest::<LapRecord>(), Ok(None));
    }

    const LAP: &[u8] = b"{\"lap_duration\":91.154,\"lap_number\":12}";

    #[test]
    fn test_full_record_survives_closing_bytes() {
        let mut body = std::vec::Vec::new();
        body.push(b'[');
        body.extend_from_slice(LAP);
        body.extend_from_slice(b"]\r\n");

        let mut tail = TailBuffer::<39>::new();
        assert_eq!(LAP.len(), 39);
        tail.extend(&body);
        assert_eq!(tail.as_bytes(), LAP);
        assert!(!tail.is_truncated());
        let lap = tail.latest::<LapRecord>().unwrap().unwrap();
        assert_eq!(lap.lap_number, LapNumber::Known(12));
    }

    #[test]
    fn test_newest_record_survives_closing_bytes_after_trim() {
        let mut body = std::vec::Vec::new();
        body.extend_from_slice(b"[\n  ");
        body.extend_from_slice(b"{\"lap_duration\":90.000,\"lap_number\":11}");
        body.extend_from_slice(b",\n  ");
        body.extend_from_slice(LAP);
        body.extend_from_slice(b"\n]\n");

        let tail = fill::<40>(&body);
        assert!(tail.is_truncated());
        assert_eq!(&tail.as_bytes()[1..], LAP);
        let lap = tail.latest::<LapRecord>().unwrap().unwrap();
        assert_eq!(lap.lap_number, LapNumber::Known(12));
    }

    #[test]
    fn test_object_survives_trailing_newline() {
        let mut body = std::vec::Vec::new();
        body.extend_from_slice(LAP);
        body.extend_from_slice(b"\r\n");

        let tail = fill::<39>(&body);
        assert!(!tail.is_truncated());
        let lap = tail.latest::<LapRecord>().unwrap().unwrap();
        assert_eq!(lap.lap_number, LapNumber::Known(12));
    }

    #[test]
    fn test_latest_shapes() {
        assert_eq!(fill::<64>(b"").latest::<LapRecord>(), Ok(None));
        assert_eq!(
            fill::<64>(b"Internal Server Error").latest::<LapRecord>(),
            Err(ParseError::UnexpectedShape)
        );
        assert_eq!(fill::<64>(b"[]").latest::<LapRecord>(), Ok(None));
    }
}
