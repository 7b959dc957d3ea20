//! Board-agnostic core logic for the Pitwall live timing client
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Minimal HTTP/1.0 transport over any async byte connection
//! - Tail-buffer extractor for "latest record" endpoints
//! - Streaming list parser for standings-style arrays
//! - Cooperative scheduling helpers (input gate, yielding reads, cadence)
//! - Fetch orchestration with change detection
//! - Configuration type definitions and a small TOML-subset parser
//!
//! Nothing here allocates: every buffer is a fixed-capacity `heapless`
//! container or a stack array sized by a const generic.

#![no_std]
#![deny(unsafe_code)]

pub mod api;
pub mod config;
pub mod error;
pub mod extract;
pub mod http;
pub mod orchestrator;
pub mod records;
pub mod scheduler;
pub mod stream;
pub mod traits;
pub mod transport;

#[cfg(test)]
extern crate std;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{FetchError, NetworkError, ParseError, ProtocolError};
pub use records::{DriverNumber, LapNumber, LapRecord, LapTime, StandingsEntry};
