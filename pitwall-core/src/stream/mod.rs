//! Streaming list parser
//!
//! Decodes standings-style payloads (a JSON array of objects, possibly
//! wrapped in an object) one record at a time. Memory use does not grow
//! with the length of the list, and the consumer can stop the stream as
//! soon as it has what it needs.

pub mod alias;
pub mod parser;
pub mod standings;

pub use alias::AliasSet;
pub use parser::{ListParser, MAX_DEPTH};
pub use standings::{fill_with_defaults, TopDrivers};

use crate::error::FetchError;
use crate::records::StandingsEntry;
use crate::traits::ChunkSource;

/// Consumer verdict after each record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Flow {
    Continue,
    Stop,
}

/// Feed `source` through a [`ListParser`], handing each entry to `consumer`
///
/// Returns [`Flow::Stop`] when the consumer ended the stream early; the
/// source is closed at once and no further reads are issued. Returns
/// [`Flow::Continue`] when the body was read to the end.
pub async fn parse_list<S, F>(source: &mut S, mut consumer: F) -> Result<Flow, FetchError>
where
    S: ChunkSource,
    F: FnMut(StandingsEntry) -> Flow,
{
    let mut parser = ListParser::new();
    let result = drive(&mut parser, source, &mut consumer).await;
    match result {
        Ok(Flow::Continue) => {}
        _ => source.close(),
    }
    result
}

async fn drive<S, F>(parser: &mut ListParser, source: &mut S, consumer: &mut F) -> Result<Flow, FetchError>
where
    S: ChunkSource,
    F: FnMut(StandingsEntry) -> Flow,
{
    while let Some(chunk) = source.read_chunk().await? {
        for &byte in chunk {
            if let Some(entry) = parser.feed(byte)? {
                if consumer(entry) == Flow::Stop {
                    return Ok(Flow::Stop);
                }
            }
        }
    }
    parser.finish()?;
    Ok(Flow::Continue)
}
