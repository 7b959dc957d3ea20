//! Reverse candidate scan
//!
//! Walks a buffer right to left and yields every outermost `{...}` span,
//! most recent first. Braces inside string literals are ignored; a quote
//! preceded by an odd run of backslashes is escaped and does not toggle
//! the string state.

/// Iterator over outermost object spans, right to left
pub struct Candidates<'a> {
    buf: &'a [u8],
    /// Bytes at and after `pos` have been scanned
    pos: usize,
}

impl<'a> Candidates<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            pos: buf.len(),
        }
    }
}

/// Check whether the quote at `i` is escaped
fn is_escaped(buf: &[u8], i: usize) -> bool {
    let backslashes = buf[..i].iter().rev().take_while(|&&b| b == b'\\').count();
    backslashes % 2 == 1
}

impl<'a> Iterator for Candidates<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<&'a [u8]> {
        let mut depth: u16 = 0;
        let mut in_string = false;
        let mut end = 0;

        while self.pos > 0 {
            self.pos -= 1;
            let i = self.pos;
            let byte = self.buf[i];

            if byte == b'"' && !is_escaped(self.buf, i) {
                in_string = !in_string;
                continue;
            }
            if in_string {
                continue;
            }

            match byte {
                b'}' => {
                    if depth == 0 {
                        end = i + 1;
                    }
                    depth = depth.saturating_add(1);
                }
                b'{' if depth > 0 => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(&self.buf[i..end]);
                    }
                }
                _ => {}
            }
        }

        None
    }
}
