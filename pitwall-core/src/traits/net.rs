//! Network connection abstractions
//!
//! The transport only needs "open a byte stream to host:port" plus the
//! `embedded-io-async` read/write traits on the result. Timeouts are the
//! connector's job: a read that exceeds its deadline must fail with
//! [`embedded_io_async::ErrorKind::TimedOut`].

use embedded_io_async::{Read, Write};

use crate::error::NetworkError;

/// URL scheme, i.e. whether the connection must be encrypted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    /// Port used when the URL does not name one
    pub const fn default_port(self) -> u16 {
        match self {
            Scheme::Http => 80,
            Scheme::Https => 443,
        }
    }
}

/// An open, bidirectional byte stream
pub trait Connection: Read + Write {
    /// Abort the connection without draining pending data
    fn close(&mut self);
}

/// Opens connections to remote hosts
#[allow(async_fn_in_trait)]
pub trait Connector {
    /// Connection type, which may borrow socket buffers from the connector
    type Connection<'a>: Connection
    where
        Self: 'a;

    /// Resolve `host` and connect to `port`
    ///
    /// Must give up with [`NetworkError::Timeout`] once the configured
    /// connect timeout elapses.
    async fn connect(
        &mut self,
        scheme: Scheme,
        host: &str,
        port: u16,
    ) -> Result<Self::Connection<'_>, NetworkError>;
}
