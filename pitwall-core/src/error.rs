//! Error taxonomy for fetch cycles
//!
//! Every failure is captured as a typed value at its point of origin and
//! travels up to the orchestrator, which turns it into a [`FetchOutcome`].
//! "No acceptable record" is deliberately *not* an error: it is the
//! `NoData` outcome.
//!
//! [`FetchOutcome`]: crate::orchestrator::FetchOutcome

/// Connection-level failures. Always recoverable on the next cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NetworkError {
    /// Host name could not be resolved
    Dns,
    /// TCP connection could not be established
    Connect,
    /// Connect or read exceeded the configured timeout
    Timeout,
    /// Read or write failed on an open connection
    Io,
    /// Peer closed the connection before the response head was complete
    Closed,
    /// Connector cannot open this kind of connection (e.g. TLS)
    UnsupportedScheme,
}

/// HTTP-level failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProtocolError {
    /// Server answered with a non-2xx status code
    Status(u16),
    /// Status line did not look like `HTTP/1.x NNN`
    MalformedStatusLine,
    /// A header line could not be parsed
    MalformedHeader,
    /// Status line and headers did not fit in the head buffer
    HeadTooLarge,
    /// Body uses a transfer encoding we do not decode
    UnsupportedEncoding,
    /// Request URL is not an `http://` or `https://` URL
    InvalidUrl,
    /// Request did not fit in the request buffer
    RequestTooLarge,
}

/// Structural failures detected while scanning a JSON payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Stream ended inside a string literal
    UnterminatedString,
    /// Stream ended with open objects or arrays
    Unbalanced,
    /// A closer did not match the innermost open container
    MismatchedCloser,
    /// Nesting exceeded the parser's container stack
    TooDeep,
    /// Body did not start with `{` or `[`
    UnexpectedShape,
}

/// Any failure of a single fetch-and-parse cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FetchError {
    Network(NetworkError),
    Protocol(ProtocolError),
    Parse(ParseError),
}

impl FetchError {
    /// HTTP status code carried by this error, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            FetchError::Protocol(ProtocolError::Status(code)) => Some(*code),
            _ => None,
        }
    }

    /// Check if the failure happened before any response was received
    pub fn is_network(&self) -> bool {
        matches!(self, FetchError::Network(_))
    }
}

impl From<NetworkError> for FetchError {
    fn from(e: NetworkError) -> Self {
        FetchError::Network(e)
    }
}

impl From<ProtocolError> for FetchError {
    fn from(e: ProtocolError) -> Self {
        FetchError::Protocol(e)
    }
}

impl From<ParseError> for FetchError {
    fn from(e: ParseError) -> Self {
        FetchError::Parse(e)
    }
}
