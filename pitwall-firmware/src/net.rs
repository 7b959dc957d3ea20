//! TCP connector over the embassy-net stack
//!
//! One connection at a time: the socket buffers live in the connector
//! and each connection borrows them until it is dropped.

use defmt::*;
use embassy_net::dns::DnsQueryType;
use embassy_net::tcp::{self, TcpSocket};
use embassy_net::{IpAddress, Ipv4Address, Stack};
use embassy_time::{with_timeout, Duration};
use embedded_io_async::{ErrorKind, ErrorType, Read, Write};

use pitwall_core::config::NetworkConfig;
use pitwall_core::error::NetworkError;
use pitwall_core::traits::{Connection, Connector, Scheme};

/// Receive and transmit buffer size per socket
pub const SOCKET_BUF_BYTES: usize = 1024;

/// Opens plain TCP connections through `stack`
pub struct TcpConnector<'d> {
    stack: Stack<'d>,
    rx: [u8; SOCKET_BUF_BYTES],
    tx: [u8; SOCKET_BUF_BYTES],
    connect_timeout: Duration,
    io_timeout: Duration,
}

impl<'d> TcpConnector<'d> {
    pub fn new(stack: Stack<'d>, config: &NetworkConfig) -> Self {
        Self {
            stack,
            rx: [0; SOCKET_BUF_BYTES],
            tx: [0; SOCKET_BUF_BYTES],
            connect_timeout: Duration::from_millis(config.connect_timeout_ms.into()),
            io_timeout: Duration::from_millis(config.read_timeout_ms.into()),
        }
    }

    async fn resolve(&self, host: &str) -> Result<IpAddress, NetworkError> {
        if let Ok(addr) = host.parse::<Ipv4Address>() {
            return Ok(IpAddress::Ipv4(addr));
        }

        let addrs = with_timeout(self.connect_timeout, self.stack.dns_query(host, DnsQueryType::A))
            .await
            .map_err(|_| NetworkError::Timeout)?
            .map_err(|e| {
                warn!("DNS lookup of {} failed: {:?}", host, e);
                NetworkError::Dns
            })?;
        addrs.first().copied().ok_or(NetworkError::Dns)
    }
}

impl<'d> Connector for TcpConnector<'d> {
    type Connection<'a>
        = TcpConnection<'a>
    where
        Self: 'a;

    async fn connect(
        &mut self,
        scheme: Scheme,
        host: &str,
        port: u16,
    ) -> Result<Self::Connection<'_>, NetworkError> {
        if scheme == Scheme::Https {
            return Err(NetworkError::UnsupportedScheme);
        }

        let addr = self.resolve(host).await?;
        let connect_timeout = self.connect_timeout;
        let io_timeout = self.io_timeout;

        let mut socket = TcpSocket::new(self.stack, &mut self.rx, &mut self.tx);
        match with_timeout(connect_timeout, socket.connect((addr, port))).await {
            Ok(Ok(())) => {
                trace!("Connected to {}:{}", host, port);
                Ok(TcpConnection { socket, io_timeout })
            }
            Ok(Err(e)) => {
                debug!("Connect to {}:{} failed: {:?}", host, port, e);
                socket.abort();
                Err(NetworkError::Connect)
            }
            Err(_) => {
                socket.abort();
                Err(NetworkError::Timeout)
            }
        }
    }
}

/// Socket I/O failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnError {
    /// No progress within the read timeout
    TimedOut,
    Tcp(tcp::Error),
}

impl embedded_io_async::Error for ConnError {
    fn kind(&self) -> ErrorKind {
        match self {
            ConnError::TimedOut => ErrorKind::TimedOut,
            ConnError::Tcp(_) => ErrorKind::ConnectionReset,
        }
    }
}

/// An open TCP connection with a deadline on every operation
pub struct TcpConnection<'a> {
    socket: TcpSocket<'a>,
    io_timeout: Duration,
}

impl ErrorType for TcpConnection<'_> {
    type Error = ConnError;
}

impl Read for TcpConnection<'_> {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, ConnError> {
        match with_timeout(self.io_timeout, self.socket.read(buf)).await {
            Ok(result) => result.map_err(ConnError::Tcp),
            Err(_) => Err(ConnError::TimedOut),
        }
    }
}

impl Write for TcpConnection<'_> {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, ConnError> {
        match with_timeout(self.io_timeout, self.socket.write(buf)).await {
            Ok(result) => result.map_err(ConnError::Tcp),
            Err(_) => Err(ConnError::TimedOut),
        }
    }

    async fn flush(&mut self) -> Result<(), ConnError> {
        match with_timeout(self.io_timeout, self.socket.flush()).await {
            Ok(result) => result.map_err(ConnError::Tcp),
            Err(_) => Err(ConnError::TimedOut),
        }
    }
}

impl Connection for TcpConnection<'_> {
    fn close(&mut self) {
        self.socket.abort();
    }
}
