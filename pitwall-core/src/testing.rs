//! Test doubles shared by the unit tests

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::format;
use std::rc::Rc;
use std::string::String;
use std::vec::Vec;

use embedded_io_async::{ErrorKind, ErrorType, Read, Write};

use crate::error::{FetchError, NetworkError};
use crate::traits::{ButtonSet, Buttons, ChunkSource, Clock, Connection, Connector, Scheme};

/// One scripted read on a mock connection
#[derive(Debug, Clone, Copy)]
pub enum MockStep {
    /// Deliver these bytes (possibly across several reads)
    Data(&'static [u8]),
    /// Fail the read with `ErrorKind::TimedOut`
    Timeout,
    /// Fail the read with a generic error
    Error,
}

/// What happened on the mock connections
#[derive(Debug, Default)]
pub struct MockLog {
    pub written: Vec<u8>,
    pub connected_to: Option<String>,
    pub connects: usize,
    pub reads: usize,
    pub closed: bool,
    /// Total `close` calls across all connections
    pub closes: usize,
}

/// Connector that replays one script per connection
pub struct MockConnector {
    scripts: VecDeque<Vec<MockStep>>,
    refuse: Option<NetworkError>,
    log: Rc<RefCell<MockLog>>,
}

impl MockConnector {
    /// A connector serving a single connection
    pub fn new(steps: &[MockStep]) -> Self {
        Self::with_scripts(&[steps])
    }

    /// A connector serving one connection per script, in order
    pub fn with_scripts(scripts: &[&[MockStep]]) -> Self {
        Self {
            scripts: scripts.iter().map(|s| s.to_vec()).collect(),
            refuse: None,
            log: Rc::default(),
        }
    }

    /// A connector that fails every connect
    pub fn refusing(error: NetworkError) -> Self {
        Self {
            scripts: VecDeque::new(),
            refuse: Some(error),
            log: Rc::default(),
        }
    }

    /// Shared handle to the connection log
    pub fn log(&self) -> Rc<RefCell<MockLog>> {
        self.log.clone()
    }
}

impl Connector for MockConnector {
    type Connection<'a>
        = MockConnection
    where
        Self: 'a;

    async fn connect(
        &mut self,
        _scheme: Scheme,
        host: &str,
        port: u16,
    ) -> Result<MockConnection, NetworkError> {
        if let Some(error) = self.refuse {
            return Err(error);
        }
        let steps = self.scripts.pop_front().ok_or(NetworkError::Connect)?;

        let mut log = self.log.borrow_mut();
        log.connects += 1;
        log.connected_to = Some(format!("{}:{}", host, port));
        log.closed = false;

        Ok(MockConnection {
            steps: steps.into(),
            log: self.log.clone(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockIoError(ErrorKind);

impl embedded_io_async::Error for MockIoError {
    fn kind(&self) -> ErrorKind {
        self.0
    }
}

/// Connection replaying a script
pub struct MockConnection {
    steps: VecDeque<MockStep>,
    log: Rc<RefCell<MockLog>>,
}

impl ErrorType for MockConnection {
    type Error = MockIoError;
}

impl Read for MockConnection {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, MockIoError> {
        assert!(!self.log.borrow().closed, "read after close");
        self.log.borrow_mut().reads += 1;

        match self.steps.pop_front() {
            None => Ok(0),
            Some(MockStep::Timeout) => Err(MockIoError(ErrorKind::TimedOut)),
            Some(MockStep::Error) => Err(MockIoError(ErrorKind::ConnectionReset)),
            Some(MockStep::Data(data)) => {
                let n = data.len().min(buf.len());
                buf[..n].copy_from_slice(&data[..n]);
                if n < data.len() {
                    self.steps.push_front(MockStep::Data(&data[n..]));
                }
                Ok(n)
            }
        }
    }
}

impl Write for MockConnection {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, MockIoError> {
        self.log.borrow_mut().written.extend_from_slice(buf);
        Ok(buf.len())
    }

    async fn flush(&mut self) -> Result<(), MockIoError> {
        Ok(())
    }
}

impl Connection for MockConnection {
    fn close(&mut self) {
        let mut log = self.log.borrow_mut();
        log.closed = true;
        log.closes += 1;
    }
}

/// Shared event log for interleaving tests
pub type EventLog = Rc<RefCell<Vec<&'static str>>>;

/// Chunk source replaying a body in fixed pieces
pub struct ScriptedSource {
    chunks: VecDeque<Result<Vec<u8>, FetchError>>,
    current: Vec<u8>,
    pub reads: usize,
    pub closed: bool,
    events: Option<EventLog>,
}

impl ScriptedSource {
    /// Serve `body` in pieces of `chunk` bytes
    pub fn split(body: &[u8], chunk: usize) -> Self {
        Self::from_chunks(body.chunks(chunk.max(1)).map(|c| c.to_vec()).collect())
    }

    /// Serve exactly these chunks
    pub fn from_chunks(chunks: Vec<Vec<u8>>) -> Self {
        Self {
            chunks: chunks.into_iter().map(Ok).collect(),
            current: Vec::new(),
            reads: 0,
            closed: false,
            events: None,
        }
    }

    /// Fail with `error` after the scripted chunks
    pub fn then_fail(mut self, error: FetchError) -> Self {
        self.chunks.push_back(Err(error));
        self
    }

    /// Record a `"read"` event for every chunk
    pub fn with_events(mut self, events: EventLog) -> Self {
        self.events = Some(events);
        self
    }
}

impl ChunkSource for ScriptedSource {
    async fn read_chunk(&mut self) -> Result<Option<&[u8]>, FetchError> {
        assert!(!self.closed, "read after close");
        self.reads += 1;
        if let Some(events) = &self.events {
            events.borrow_mut().push("read");
        }

        match self.chunks.pop_front() {
            None => Ok(None),
            Some(Err(e)) => Err(e),
            Some(Ok(chunk)) => {
                self.current = chunk;
                Ok(Some(&self.current))
            }
        }
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

/// Manually advanced clock
#[derive(Debug, Clone, Default)]
pub struct TestClock(pub Rc<Cell<u64>>);

impl TestClock {
    pub fn at(ms: u64) -> Self {
        Self(Rc::new(Cell::new(ms)))
    }

    pub fn advance(&self, ms: u64) {
        self.0.set(self.0.get() + ms);
    }

    pub fn set(&self, ms: u64) {
        self.0.set(ms);
    }
}

impl Clock for TestClock {
    fn now_ms(&self) -> u64 {
        self.0.get()
    }
}

/// Delay that advances a [`TestClock`] instead of sleeping
pub struct TestDelay {
    pub clock: TestClock,
    pub events: Option<EventLog>,
}

impl TestDelay {
    pub fn new(clock: TestClock) -> Self {
        Self {
            clock,
            events: None,
        }
    }
}

impl embedded_hal_async::delay::DelayNs for TestDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.clock.advance(u64::from(ns) / 1_000_000);
        if let Some(events) = &self.events {
            events.borrow_mut().push("sleep");
        }
        embassy_futures::yield_now().await;
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.clock.advance(u64::from(ms));
        if let Some(events) = &self.events {
            events.borrow_mut().push("sleep");
        }
        embassy_futures::yield_now().await;
    }
}

/// Buttons replaying a sequence of samples, then holding the last
pub struct ScriptedButtons {
    samples: VecDeque<ButtonSet>,
    last: ButtonSet,
}

impl ScriptedButtons {
    pub fn new(samples: &[ButtonSet]) -> Self {
        Self {
            samples: samples.iter().copied().collect(),
            last: ButtonSet::empty(),
        }
    }
}

impl Buttons for ScriptedButtons {
    fn sample(&mut self) -> ButtonSet {
        if let Some(next) = self.samples.pop_front() {
            self.last = next;
        }
        self.last
    }
}
