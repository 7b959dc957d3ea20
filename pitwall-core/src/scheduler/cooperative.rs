//! Yield points around chunk reads

use embassy_futures::yield_now;

use crate::error::FetchError;
use crate::traits::ChunkSource;

/// Wraps a [`ChunkSource`] so every read first yields to the executor
///
/// On a single-threaded executor this guarantees the input-poll task a
/// turn between any two chunk reads, even when the network has data
/// ready and the read itself would not suspend.
pub struct YieldingSource<S> {
    inner: S,
}

impl<S: ChunkSource> YieldingSource<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: ChunkSource> ChunkSource for YieldingSource<S> {
    async fn read_chunk(&mut self) -> Result<Option<&[u8]>, FetchError> {
        yield_now().await;
        self.inner.read_chunk().await
    }

    fn close(&mut self) {
        self.inner.close();
    }
}
