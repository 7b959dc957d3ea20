//! Minimal HTTP/1.0 client pieces
//!
//! Sans-I/O building blocks used by the transport:
//!
//! - [`url`]: split `http://host:port/path?query` into parts
//! - [`request`]: immutable GET request builder and serializer
//! - [`response`]: status line and header parsing
//!
//! Requests are sent as HTTP/1.0 with `Connection: close` so well-behaved
//! servers answer with a length-terminated (or close-terminated) body and
//! never use chunked transfer encoding.

pub mod request;
pub mod response;
pub mod url;

pub use request::{FetchRequest, MAX_REQUEST_LEN, MAX_URL_LEN};
pub use response::{parse_head, ResponseHead};
pub use url::Url;
