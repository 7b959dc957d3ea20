//! Chunked body source
//!
//! The extractor and the streaming parser consume bodies through this
//! trait rather than through the HTTP response directly, so the
//! scheduler can wrap reads (see [`YieldingSource`]) and tests can script
//! chunk boundaries.
//!
//! [`YieldingSource`]: crate::scheduler::YieldingSource

use crate::error::FetchError;

/// A body delivered as a sequence of bounded chunks
#[allow(async_fn_in_trait)]
pub trait ChunkSource {
    /// Read the next chunk
    ///
    /// Returns `Ok(Some(bytes))` with a non-empty chunk, `Ok(None)` at the
    /// end of the body, or an error. This is the only suspension point a
    /// fetch task has.
    async fn read_chunk(&mut self) -> Result<Option<&[u8]>, FetchError>;

    /// Stop reading and release the underlying connection
    ///
    /// After `close` no further reads are issued.
    fn close(&mut self);
}
