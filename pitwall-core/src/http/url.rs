//! URL splitting
//!
//! Only what a GET needs: scheme, host, port and the request target.
//! No userinfo, no fragments, no IPv6 literals.

use crate::error::ProtocolError;
use crate::traits::Scheme;

/// Borrowed view of a parsed URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Url<'a> {
    pub scheme: Scheme,
    pub host: &'a str,
    pub port: u16,
    /// Path plus query, always starting with `/`
    pub target: &'a str,
}

impl<'a> Url<'a> {
    /// Parse an absolute `http://` or `https://` URL
    pub fn parse(url: &'a str) -> Result<Self, ProtocolError> {
        let (scheme, rest) = if let Some(rest) = url.strip_prefix("http://") {
            (Scheme::Http, rest)
        } else if let Some(rest) = url.strip_prefix("https://") {
            (Scheme::Https, rest)
        } else {
            return Err(ProtocolError::InvalidUrl);
        };

        let split = rest.find(['/', '?']).unwrap_or(rest.len());
        let (authority, target) = rest.split_at(split);
        let target = if target.is_empty() { "/" } else { target };
        if target.starts_with('?') {
            // "http://host?x=1" has no path; servers expect one
            return Err(ProtocolError::InvalidUrl);
        }

        let (host, port) = match authority.rsplit_once(':') {
            Some((host, port)) => {
                let port = port.parse().map_err(|_| ProtocolError::InvalidUrl)?;
                (host, port)
            }
            None => (authority, scheme.default_port()),
        };

        if host.is_empty() || host.contains('@') {
            return Err(ProtocolError::InvalidUrl);
        }

        Ok(Self {
            scheme,
            host,
            port,
            target,
        })
    }

    /// Whether the URL asks for an encrypted connection
    pub fn is_secure(&self) -> bool {
        self.scheme == Scheme::Https
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_port() {
        let url = Url::parse("http://192.168.26.249:8000/v1/laps?session_key=latest").unwrap();
        assert_eq!(url.scheme, Scheme::Http);
        assert_eq!(url.host, "192.168.26.249");
        assert_eq!(url.port, 8000);
        assert_eq!(url.target, "/v1/laps?session_key=latest");
        assert!(!url.is_secure());
    }

    #[test]
    fn test_parse_default_ports() {
        let url = Url::parse("https://api.example.com").unwrap();
        assert_eq!(url.port, 443);
        assert_eq!(url.target, "/");
        assert!(url.is_secure());

        let url = Url::parse("http://example.com/x").unwrap();
        assert_eq!(url.port, 80);
    }

    #[test]
    fn test_parse_rejects() {
        assert_eq!(Url::parse("ftp://x/"), Err(ProtocolError::InvalidUrl));
        assert_eq!(Url::parse("http:///path"), Err(ProtocolError::InvalidUrl));
        assert_eq!(Url::parse("http://host:notaport/"), Err(ProtocolError::InvalidUrl));
        assert_eq!(Url::parse("http://host?x=1"), Err(ProtocolError::InvalidUrl));
    }
}
