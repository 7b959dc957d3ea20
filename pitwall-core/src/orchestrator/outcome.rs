//! Per-fetch outcomes and their display labels

use core::fmt;

use crate::error::FetchError;

/// Result of one fetch-and-parse call
///
/// `NoData` is a normal outcome: the service answered but held no record
/// that passed validation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FetchOutcome<T> {
    Value(T),
    NoData,
    Error(FetchError),
}

impl<T> FetchOutcome<T> {
    /// Label for anything other than a value
    pub fn status(&self) -> Option<Status> {
        match self {
            FetchOutcome::Value(_) => None,
            FetchOutcome::NoData => Some(Status::NoData),
            FetchOutcome::Error(e) => Some(Status::from_error(e)),
        }
    }

    pub fn value(self) -> Option<T> {
        match self {
            FetchOutcome::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, FetchOutcome::Error(_))
    }
}

impl<T> From<Result<Option<T>, FetchError>> for FetchOutcome<T> {
    fn from(result: Result<Option<T>, FetchError>) -> Self {
        match result {
            Ok(Some(v)) => FetchOutcome::Value(v),
            Ok(None) => FetchOutcome::NoData,
            Err(e) => FetchOutcome::Error(e),
        }
    }
}

/// Closed vocabulary shown in place of a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Status {
    /// "no data yet"
    NoData,
    /// "fetch error"
    FetchError,
    /// "HTTP <code>"
    Http(u16),
}

impl Status {
    /// Non-2xx responses keep their code, every other failure is generic
    pub fn from_error(error: &FetchError) -> Self {
        match error.status_code() {
            Some(code) => Status::Http(code),
            None => Status::FetchError,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::NoData => f.write_str("no data yet"),
            Status::FetchError => f.write_str("fetch error"),
            Status::Http(code) => write!(f, "HTTP {}", code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{NetworkError, ParseError, ProtocolError};
    use std::string::ToString;

    #[test]
    fn test_from_result() {
        let ok: FetchOutcome<u8> = Ok(Some(7)).into();
        assert_eq!(ok, FetchOutcome::Value(7));
        assert_eq!(ok.status(), None);

        let empty: FetchOutcome<u8> = Ok(None).into();
        assert_eq!(empty.status(), Some(Status::NoData));

        let failed: FetchOutcome<u8> = Err(NetworkError::Timeout.into()).into();
        assert!(failed.is_error());
        assert_eq!(failed.status(), Some(Status::FetchError));
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(Status::NoData.to_string(), "no data yet");
        assert_eq!(Status::FetchError.to_string(), "fetch error");
        assert_eq!(Status::Http(503).to_string(), "HTTP 503");
    }

    #[test]
    fn test_status_from_error() {
        assert_eq!(
            Status::from_error(&ProtocolError::Status(404).into()),
            Status::Http(404)
        );
        assert_eq!(
            Status::from_error(&ParseError::Unbalanced.into()),
            Status::FetchError
        );
    }
}
