//! Chunked HTTP transport
//!
//! Opens a connection through a [`Connector`], sends one GET, parses the
//! response head and hands out the body one bounded chunk at a time.
//!
//! [`Connector`]: crate::traits::Connector

pub mod client;

pub use client::{HttpClient, HttpResponse, CHUNK_BYTES, MAX_HEAD_BYTES};
