//! Byte-level list parser
//!
//! Accepts either a bare array of records or an object wrapping one
//! recognized array field. Only the fields named in the alias sets are
//! captured; everything else is skipped while nesting and string state
//! are tracked.

use heapless::Vec;

use super::alias::{IDENTIFIER, LIST_FIELD, NESTED_IDENTIFIER, NESTED_OWNER, POINTS, POSITION};
use crate::error::ParseError;
use crate::records::{parse_u16, DriverNumber, StandingsEntry};

/// Maximum nesting of objects and arrays
pub const MAX_DEPTH: usize = 16;

/// Longest key we try to match against the alias sets
const KEY_CAPACITY: usize = 32;

/// Longest scalar value we capture
const VALUE_CAPACITY: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Object,
    Array,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Before the top-level value, or after it closed
    Outside,
    /// Between tokens somewhere inside the top-level value
    InObject,
    /// Inside a string literal
    InString,
    /// Right after a backslash inside a string
    Escaped,
    /// Inside a number or `true`/`false`/`null`
    InScalar,
}

/// What the current string or scalar is being read for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capture {
    Skip,
    Key,
    Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TopLevel {
    Unknown,
    Array,
    Object,
}

/// A recognized key awaiting its value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Identifier(u8),
    NestedIdentifier(u8),
    Position(u8),
    Points,
    List,
}

/// Object whose keys are matched against the alias sets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    /// Top-level object that may wrap the list or be the only entry
    Wrapper,
    /// Element of the record list
    Record,
    /// Object-valued `driver` field of a record or the wrapper
    Driver,
}

/// (outer alias rank, nested alias rank); lower wins
type Priority = (u8, u8);

/// Fields gathered for the record being parsed
#[derive(Debug, Clone, Copy, Default)]
struct Draft {
    identifier: Option<(Priority, DriverNumber)>,
    position: Option<(u8, u16)>,
    points: Option<(u8, f32)>,
}

impl Draft {
    fn offer_identifier(&mut self, priority: Priority, number: DriverNumber) {
        if self.identifier.map_or(true, |(p, _)| priority < p) {
            self.identifier = Some((priority, number));
        }
    }

    fn offer_position(&mut self, rank: u8, position: u16) {
        if self.position.map_or(true, |(r, _)| rank < r) {
            self.position = Some((rank, position));
        }
    }

    fn offer_points(&mut self, rank: u8, points: f32) {
        if self.points.map_or(true, |(r, _)| rank < r) {
            self.points = Some((rank, points));
        }
    }

    fn entry(&self, index: u16) -> Option<StandingsEntry> {
        let (_, driver_number) = self.identifier?;
        Some(StandingsEntry {
            driver_number,
            position: self.position.map(|(_, p)| p),
            points: self.points.map(|(_, p)| p),
            index,
        })
    }
}

/// Incremental parser emitting one [`StandingsEntry`] per record
///
/// Feed it bytes in order; memory use is constant in the length of the
/// list.
#[derive(Debug, Clone)]
pub struct ListParser {
    state: State,
    capture: Capture,
    top: TopLevel,
    stack: Vec<Container, MAX_DEPTH>,
    /// Next string in the innermost object is a key
    expect_key: bool,
    key: Vec<u8, KEY_CAPACITY>,
    key_overflow: bool,
    value: Vec<u8, VALUE_CAPACITY>,
    value_overflow: bool,
    pending: Option<Field>,
    /// Stack depth inside the record list
    list_depth: Option<usize>,
    list_done: bool,
    /// Stack depth inside an object-valued `driver` field
    driver_depth: Option<usize>,
    record: Draft,
    wrapper: Draft,
    /// Index of the current element within the record list
    index: u16,
}

impl Default for ListParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ListParser {
    pub const fn new() -> Self {
        Self {
            state: State::Outside,
            capture: Capture::Skip,
            top: TopLevel::Unknown,
            stack: Vec::new(),
            expect_key: false,
            key: Vec::new(),
            key_overflow: false,
            value: Vec::new(),
            value_overflow: false,
            pending: None,
            list_depth: None,
            list_done: false,
            driver_depth: None,
            record: Draft {
                identifier: None,
                position: None,
                points: None,
            },
            wrapper: Draft {
                identifier: None,
                position: None,
                points: None,
            },
            index: 0,
        }
    }

    /// Check whether the top-level value has been closed
    pub fn is_complete(&self) -> bool {
        self.top != TopLevel::Unknown && self.stack.is_empty()
    }

    /// Process one byte
    ///
    /// Returns an entry when the byte completes a record that carries an
    /// identifier.
    pub fn feed(&mut self, byte: u8) -> Result<Option<StandingsEntry>, ParseError> {
        match self.state {
            State::Outside => self.outside(byte).map(|_| None),
            State::InString => {
                match byte {
                    b'\\' => self.state = State::Escaped,
                    b'"' => {
                        self.state = State::InObject;
                        return Ok(self.end_string());
                    }
                    _ => self.capture_byte(byte),
                }
                Ok(None)
            }
            State::Escaped => {
                self.state = State::InString;
                self.capture_byte(byte);
                Ok(None)
            }
            State::InScalar => {
                if matches!(byte, b',' | b'}' | b']') || byte.is_ascii_whitespace() {
                    self.state = State::InObject;
                    let from_scalar = self.end_value();
                    let from_byte = self.structural(byte)?;
                    Ok(from_scalar.or(from_byte))
                } else {
                    self.capture_byte(byte);
                    Ok(None)
                }
            }
            State::InObject => self.structural(byte),
        }
    }

    /// Signal the end of the stream
    pub fn finish(&self) -> Result<(), ParseError> {
        match self.state {
            State::InString | State::Escaped => Err(ParseError::UnterminatedString),
            _ if !self.stack.is_empty() => Err(ParseError::Unbalanced),
            _ => Ok(()),
        }
    }

    fn outside(&mut self, byte: u8) -> Result<(), ParseError> {
        if byte.is_ascii_whitespace() || self.top != TopLevel::Unknown {
            // Anything after the top-level value is ignored
            return Ok(());
        }
        match byte {
            b'[' => {
                self.top = TopLevel::Array;
                self.push(Container::Array)?;
                self.list_depth = Some(1);
            }
            b'{' => {
                self.top = TopLevel::Object;
                self.push(Container::Object)?;
                self.expect_key = true;
            }
            _ => return Err(ParseError::UnexpectedShape),
        }
        self.state = State::InObject;
        Ok(())
    }

    fn structural(&mut self, byte: u8) -> Result<Option<StandingsEntry>, ParseError> {
        match byte {
            b'"' => {
                self.state = State::InString;
                self.capture = if self.in_object() && self.expect_key {
                    if self.scope().is_some() {
                        self.key.clear();
                        self.key_overflow = false;
                        Capture::Key
                    } else {
                        Capture::Skip
                    }
                } else {
                    self.begin_value()
                };
            }
            b'{' => self.open_object()?,
            b'[' => self.open_array()?,
            b'}' => return self.close(Container::Object),
            b']' => return self.close(Container::Array),
            b':' => self.expect_key = false,
            b',' => {
                self.pending = None;
                if self.in_object() {
                    self.expect_key = true;
                } else if self.at_list_level() {
                    self.index = self.index.saturating_add(1);
                }
            }
            b if b.is_ascii_whitespace() => {}
            _ => {
                self.state = State::InScalar;
                self.capture = self.begin_value();
                self.capture_byte(byte);
            }
        }
        Ok(None)
    }

    fn push(&mut self, container: Container) -> Result<(), ParseError> {
        self.stack.push(container).map_err(|_| ParseError::TooDeep)
    }

    fn in_object(&self) -> bool {
        self.stack.last() == Some(&Container::Object)
    }

    fn list_open(&self) -> bool {
        self.list_depth.is_some() && !self.list_done
    }

    /// Directly inside the record list, between elements
    fn at_list_level(&self) -> bool {
        self.list_open() && self.list_depth == Some(self.stack.len())
    }

    fn scope(&self) -> Option<Scope> {
        if !self.in_object() {
            return None;
        }
        let len = self.stack.len();
        if self.driver_depth == Some(len) {
            return Some(Scope::Driver);
        }
        match self.list_depth {
            Some(list) if !self.list_done && len == list + 1 => Some(Scope::Record),
            None if self.top == TopLevel::Object && len == 1 => Some(Scope::Wrapper),
            _ => None,
        }
    }

    fn draft_mut(&mut self) -> &mut Draft {
        if self.list_open() {
            &mut self.record
        } else {
            &mut self.wrapper
        }
    }

    fn begin_value(&mut self) -> Capture {
        if self.pending.is_some() || self.at_list_level() {
            self.value.clear();
            self.value_overflow = false;
            Capture::Value
        } else {
            Capture::Skip
        }
    }

    fn capture_byte(&mut self, byte: u8) {
        match self.capture {
            Capture::Key => {
                if self.key.push(byte).is_err() {
                    self.key_overflow = true;
                }
            }
            Capture::Value => {
                if self.value.push(byte).is_err() {
                    self.value_overflow = true;
                }
            }
            Capture::Skip => {}
        }
    }

    fn end_string(&mut self) -> Option<StandingsEntry> {
        match self.capture {
            Capture::Key => {
                self.capture = Capture::Skip;
                self.pending = if self.key_overflow {
                    None
                } else {
                    self.recognize()
                };
                None
            }
            Capture::Value => self.end_value(),
            Capture::Skip => None,
        }
    }

    /// Match the captured key against the alias sets of the current scope
    fn recognize(&self) -> Option<Field> {
        let key = self.key.as_slice();
        match self.scope()? {
            Scope::Driver => NESTED_IDENTIFIER.rank(key).map(Field::NestedIdentifier),
            scope => {
                if let Some(rank) = IDENTIFIER.rank(key) {
                    Some(Field::Identifier(rank))
                } else if let Some(rank) = POSITION.rank(key) {
                    Some(Field::Position(rank))
                } else if POINTS.rank(key).is_some() {
                    Some(Field::Points)
                } else if scope == Scope::Wrapper && LIST_FIELD.rank(key).is_some() {
                    Some(Field::List)
                } else {
                    None
                }
            }
        }
    }

    /// Finalize a captured string or scalar value
    fn end_value(&mut self) -> Option<StandingsEntry> {
        if self.capture != Capture::Value {
            return None;
        }
        self.capture = Capture::Skip;

        if self.value_overflow {
            self.pending = None;
            return None;
        }
        let text = core::str::from_utf8(&self.value).unwrap_or("");

        if self.at_list_level() {
            // Bare element: the value itself is the identifier
            return parse_u16(text).map(|driver_number| StandingsEntry {
                driver_number,
                position: None,
                points: None,
                index: self.index,
            });
        }

        let Some(field) = self.pending.take() else {
            return None;
        };
        match field {
            Field::Identifier(rank) => {
                if let Some(number) = parse_u16(text) {
                    self.draft_mut().offer_identifier((rank, 0), number);
                }
            }
            Field::NestedIdentifier(rank) => {
                if let Some(number) = parse_u16(text) {
                    self.draft_mut().offer_identifier((NESTED_OWNER, rank), number);
                }
            }
            Field::Position(rank) => {
                if let Some(position) = parse_u16(text) {
                    self.draft_mut().offer_position(rank, position);
                }
            }
            Field::Points => {
                if let Ok(points) = text.trim().parse::<f32>() {
                    self.draft_mut().offer_points(0, points);
                }
            }
            Field::List => {}
        }
        None
    }

    fn open_object(&mut self) -> Result<(), ParseError> {
        if self.at_list_level() {
            self.record = Draft::default();
        }
        let nested_driver = self.pending == Some(Field::Identifier(NESTED_OWNER));
        self.pending = None;

        self.push(Container::Object)?;
        self.expect_key = true;
        if nested_driver {
            self.driver_depth = Some(self.stack.len());
        }
        Ok(())
    }

    fn open_array(&mut self) -> Result<(), ParseError> {
        let is_list = self.pending == Some(Field::List) && self.list_depth.is_none();
        self.pending = None;

        self.push(Container::Array)?;
        if is_list {
            self.list_depth = Some(self.stack.len());
            self.index = 0;
        }
        Ok(())
    }

    fn close(&mut self, container: Container) -> Result<Option<StandingsEntry>, ParseError> {
        match self.stack.pop() {
            Some(open) if open == container => {}
            _ => return Err(ParseError::MismatchedCloser),
        }
        let len = self.stack.len();
        self.pending = None;
        self.expect_key = false;

        let mut emitted = None;
        match container {
            Container::Object => {
                if self.driver_depth == Some(len + 1) {
                    self.driver_depth = None;
                } else if self.list_open() && self.list_depth == Some(len) {
                    emitted = self.record.entry(self.index);
                    self.record = Draft::default();
                } else if len == 0 && self.list_depth.is_none() {
                    // Wrapper without a recognized list is itself the entry
                    emitted = self.wrapper.entry(0);
                }
            }
            Container::Array => {
                if self.list_depth == Some(len + 1) {
                    self.list_done = true;
                }
            }
        }

        if len == 0 {
            self.state = State::Outside;
        }
        Ok(emitted)
    }
}
