//! Response head parsing
//!
//! Only the status code and the body-framing headers are consumed;
//! everything else is skipped.

use crate::error::ProtocolError;

/// Parsed status line and framing headers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ResponseHead {
    /// HTTP status code
    pub status: u16,
    /// `Content-Length`, when the server sent one
    pub content_length: Option<usize>,
    /// `Transfer-Encoding: chunked` was announced
    pub chunked: bool,
}

impl ResponseHead {
    /// Check for a 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Try to parse a response head from the start of `buf`
///
/// Returns `Ok(None)` while the blank line ending the head has not been
/// received yet, or `Ok(Some((head, len)))` where `len` is the number of
/// bytes the head occupies (body bytes start at `buf[len..]`).
pub fn parse_head(buf: &[u8]) -> Result<Option<(ResponseHead, usize)>, ProtocolError> {
    let Some(end) = find_head_end(buf) else {
        return Ok(None);
    };

    let text = core::str::from_utf8(&buf[..end.content]).map_err(|_| ProtocolError::MalformedHeader)?;
    let mut lines = text.split('\n').map(|l| l.trim_end_matches('\r'));

    let status = parse_status_line(lines.next().unwrap_or(""))?;
    let mut head = ResponseHead {
        status,
        content_length: None,
        chunked: false,
    };

    for line in lines {
        if line.is_empty() {
            continue;
        }
        let (name, value) = line.split_once(':').ok_or(ProtocolError::MalformedHeader)?;
        let value = value.trim();
        if name.eq_ignore_ascii_case("content-length") {
            head.content_length = Some(value.parse().map_err(|_| ProtocolError::MalformedHeader)?);
        } else if name.eq_ignore_ascii_case("transfer-encoding") {
            head.chunked = value
                .split(',')
                .any(|coding| coding.trim().eq_ignore_ascii_case("chunked"));
        }
    }

    Ok(Some((head, end.total)))
}

struct HeadEnd {
    /// Length of status line + headers (without the blank line)
    content: usize,
    /// Length including the terminating blank line
    total: usize,
}

fn find_head_end(buf: &[u8]) -> Option<HeadEnd> {
    for i in 0..buf.len() {
        if buf[i..].starts_with(b"\r\n\r\n") {
            return Some(HeadEnd {
                content: i,
                total: i + 4,
            });
        }
        if buf[i..].starts_with(b"\n\n") {
            return Some(HeadEnd {
                content: i,
                total: i + 2,
            });
        }
    }
    None
}

/// Parse `HTTP/1.x NNN [reason]`
fn parse_status_line(line: &str) -> Result<u16, ProtocolError> {
    let mut parts = line.splitn(3, ' ');
    let version = parts.next().unwrap_or("");
    let code = parts.next().unwrap_or("");

    if !version.starts_with("HTTP/1.") {
        return Err(ProtocolError::MalformedStatusLine);
    }
    if code.len() != 3 || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ProtocolError::MalformedStatusLine);
    }
    code.parse().map_err(|_| ProtocolError::MalformedStatusLine)
}
