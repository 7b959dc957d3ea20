//! HTTP client and streaming response

use embassy_futures::yield_now;
use embedded_io_async::{ErrorKind, Read, Write};

use crate::error::{FetchError, NetworkError, ProtocolError};
use crate::http::{parse_head, FetchRequest, ResponseHead};
use crate::traits::{ChunkSource, Connection, Connector};

/// Body chunk size in bytes
pub const CHUNK_BYTES: usize = 256;

/// Maximum size of status line plus headers
pub const MAX_HEAD_BYTES: usize = 1024;

/// Map an I/O error from the connection into our taxonomy
fn map_io<E: embedded_io_async::Error>(e: E) -> NetworkError {
    match e.kind() {
        ErrorKind::TimedOut => NetworkError::Timeout,
        _ => NetworkError::Io,
    }
}

/// HTTP client bound to a connector
///
/// `N` is the chunk size: the response never holds more than `N` body
/// bytes at rest.
pub struct HttpClient<C: Connector, const N: usize = CHUNK_BYTES> {
    connector: C,
}

impl<C: Connector, const N: usize> HttpClient<C, N> {
    /// Create a new client
    pub fn new(connector: C) -> Self {
        Self { connector }
    }

    /// Access the underlying connector
    pub fn connector_mut(&mut self) -> &mut C {
        &mut self.connector
    }

    /// Issue a GET and wait for the response head
    ///
    /// Non-2xx statuses are returned as [`ProtocolError::Status`]; the body
    /// of an error response is never read. The connection is closed before
    /// any error is returned.
    pub async fn get(
        &mut self,
        request: &FetchRequest,
    ) -> Result<HttpResponse<C::Connection<'_>, N>, FetchError> {
        let url = request.target()?;
        let encoded = request.encode()?;

        let mut conn = self.connector.connect(url.scheme, url.host, url.port).await?;

        let mut head_buf = [0u8; MAX_HEAD_BYTES];
        let (head, head_len, filled) =
            match exchange_head::<_, N>(&mut conn, encoded.as_bytes(), &mut head_buf).await {
                Ok(parsed) => parsed,
                Err(e) => {
                    conn.close();
                    return Err(e);
                }
            };

        let mut leftover = filled - head_len;
        if let Some(len) = head.content_length {
            leftover = leftover.min(len);
        }

        let mut response = HttpResponse {
            conn,
            head,
            buf: [0u8; N],
            pending: leftover,
            remaining: head.content_length.map(|len| len - leftover),
            done: false,
            closed: false,
        };
        response.buf[..leftover].copy_from_slice(&head_buf[head_len..head_len + leftover]);

        Ok(response)
    }
}

/// Send `request` and read until a usable 2xx head has arrived
///
/// Returns the head, its length and the number of bytes in `head_buf`.
/// Yields before every read so input polling keeps running while the
/// server is slow to answer.
async fn exchange_head<T: Connection, const N: usize>(
    conn: &mut T,
    request: &[u8],
    head_buf: &mut [u8; MAX_HEAD_BYTES],
) -> Result<(ResponseHead, usize, usize), FetchError> {
    conn.write_all(request).await.map_err(map_io)?;
    conn.flush().await.map_err(map_io)?;

    let mut filled = 0;
    loop {
        if filled == MAX_HEAD_BYTES {
            return Err(ProtocolError::HeadTooLarge.into());
        }

        yield_now().await;

        // Bounded reads keep the body bytes that trail the head within a
        // single chunk
        let end = (filled + N).min(MAX_HEAD_BYTES);
        let n = conn.read(&mut head_buf[filled..end]).await.map_err(map_io)?;
        if n == 0 {
            return Err(NetworkError::Closed.into());
        }
        filled += n;

        if let Some((head, head_len)) = parse_head(&head_buf[..filled])? {
            if !head.is_success() {
                return Err(ProtocolError::Status(head.status).into());
            }
            if head.chunked {
                return Err(ProtocolError::UnsupportedEncoding.into());
            }
            return Ok((head, head_len, filled));
        }
    }
}

/// Response whose body is read chunk by chunk
pub struct HttpResponse<T: Connection, const N: usize = CHUNK_BYTES> {
    conn: T,
    head: ResponseHead,
    buf: [u8; N],
    /// Body bytes already sitting in `buf` (received with the head)
    pending: usize,
    /// Bytes still expected when `Content-Length` was given
    remaining: Option<usize>,
    done: bool,
    closed: bool,
}

impl<T: Connection, const N: usize> HttpResponse<T, N> {
    /// HTTP status code
    pub fn status(&self) -> u16 {
        self.head.status
    }

    /// Declared body length, if any
    pub fn content_length(&self) -> Option<usize> {
        self.head.content_length
    }

    /// Check whether the body has been fully consumed or abandoned
    pub fn is_done(&self) -> bool {
        self.done
    }
}

impl<T: Connection, const N: usize> ChunkSource for HttpResponse<T, N> {
    async fn read_chunk(&mut self) -> Result<Option<&[u8]>, FetchError> {
        if self.done {
            return Ok(None);
        }

        if self.pending > 0 {
            let n = self.pending;
            self.pending = 0;
            return Ok(Some(&self.buf[..n]));
        }

        let max = match self.remaining {
            Some(0) => {
                self.done = true;
                return Ok(None);
            }
            Some(remaining) => remaining.min(N),
            None => N,
        };

        let n = match self.conn.read(&mut self.buf[..max]).await {
            Ok(n) => n,
            Err(e) => {
                self.close();
                return Err(map_io(e).into());
            }
        };

        if n == 0 {
            self.done = true;
            return match self.remaining {
                // Peer hung up before delivering the declared length
                Some(_) => Err(NetworkError::Closed.into()),
                None => Ok(None),
            };
        }

        if let Some(remaining) = self.remaining.as_mut() {
            *remaining -= n;
        }
        Ok(Some(&self.buf[..n]))
    }

    fn close(&mut self) {
        self.done = true;
        if !self.closed {
            self.closed = true;
            self.conn.close();
        }
    }
}
