//! GET request construction

use core::fmt::{Display, Write};

use heapless::String;

use super::url::Url;
use crate::error::ProtocolError;

/// Maximum URL length including query parameters
pub const MAX_URL_LEN: usize = 192;

/// Maximum serialized request size
pub const MAX_REQUEST_LEN: usize = 384;

/// Client identification sent with every request
pub const USER_AGENT: &str = "pitwall/0.1";

/// An immutable GET request
///
/// Built once per fetch; the builder methods consume `self`, so a request
/// cannot change after it has been handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FetchRequest {
    url: String<MAX_URL_LEN>,
    has_query: bool,
}

impl FetchRequest {
    /// Start a GET request for an absolute URL
    pub fn get(url: &str) -> Result<Self, ProtocolError> {
        Url::parse(url)?;

        let mut owned = String::new();
        owned
            .push_str(url)
            .map_err(|_| ProtocolError::RequestTooLarge)?;

        Ok(Self {
            has_query: url.contains('?'),
            url: owned,
        })
    }

    /// Append a `key=value` query parameter
    ///
    /// Values are percent-encoded; keys are expected to be plain ASCII.
    pub fn query(mut self, key: &str, value: impl Display) -> Result<Self, ProtocolError> {
        let separator = if self.has_query { '&' } else { '?' };
        self.has_query = true;

        let mut encoded = PercentEncoder(String::<MAX_URL_LEN>::new());
        write!(encoded, "{}", value).map_err(|_| ProtocolError::RequestTooLarge)?;

        write!(self.url, "{}{}={}", separator, key, encoded.0.as_str())
            .map_err(|_| ProtocolError::RequestTooLarge)?;
        Ok(self)
    }

    /// The full request URL
    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Parsed view of the URL
    pub fn target(&self) -> Result<Url<'_>, ProtocolError> {
        Url::parse(self.url.as_str())
    }

    /// Serialize the request line and headers
    pub fn encode(&self) -> Result<String<MAX_REQUEST_LEN>, ProtocolError> {
        let url = self.target()?;
        let mut out = String::new();

        write!(
            out,
            "GET {} HTTP/1.0\r\nHost: {}",
            url.target, url.host
        )
        .map_err(|_| ProtocolError::RequestTooLarge)?;
        if url.port != url.scheme.default_port() {
            write!(out, ":{}", url.port).map_err(|_| ProtocolError::RequestTooLarge)?;
        }
        write!(
            out,
            "\r\nUser-Agent: {}\r\nAccept: application/json\r\nConnection: close\r\n\r\n",
            USER_AGENT
        )
        .map_err(|_| ProtocolError::RequestTooLarge)?;

        Ok(out)
    }
}

/// `fmt::Write` adapter that percent-encodes everything but unreserved bytes
struct PercentEncoder(String<MAX_URL_LEN>);

impl Write for PercentEncoder {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        for b in s.bytes() {
            let unreserved = b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~');
            if unreserved {
                self.0.push(b as char).map_err(|_| core::fmt::Error)?;
            } else {
                write!(self.0, "%{:02X}", b)?;
            }
        }
        Ok(())
    }
}
