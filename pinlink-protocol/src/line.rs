//! Line framing for byte streams
//!
//! Console UARTs and socket sessions deliver bytes in arbitrary chunks.
//! [`LineBuffer`] accumulates them and hands out one complete
//! `\n`-terminated line at a time.
//!
//! A line that outgrows the buffer is dropped as a whole: everything up to
//! and including its terminator is discarded, so no part of it is ever
//! framed as a command of its own.

use heapless::String;

/// Maximum line length in bytes, excluding the terminator
pub const MAX_LINE_SIZE: usize = 128;

/// Buffer capacity: a maximal line plus a `\r\n` terminator
pub const LINE_BUFFER_SIZE: usize = MAX_LINE_SIZE + 2;

/// Errors from line assembly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineError {
    /// The line exceeded [`MAX_LINE_SIZE`] and was dropped
    Overflow,
    /// A complete line was not valid UTF-8 and was dropped
    InvalidUtf8,
}

/// Fixed-capacity line accumulator
#[derive(Debug, Clone)]
pub struct LineBuffer {
    buffer: [u8; LINE_BUFFER_SIZE],
    len: usize,
    /// Dropping the tail of an overlong line until its terminator
    discarding: bool,
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl LineBuffer {
    /// Create an empty line buffer
    pub const fn new() -> Self {
        Self {
            buffer: [0; LINE_BUFFER_SIZE],
            len: 0,
            discarding: false,
        }
    }

    /// Number of buffered bytes
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if nothing is buffered
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Free space left in the buffer
    pub fn remaining(&self) -> usize {
        LINE_BUFFER_SIZE - self.len
    }

    /// Check if the tail of an overlong line is being dropped
    pub fn is_discarding(&self) -> bool {
        self.discarding
    }

    /// Discard all buffered bytes
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Check if a complete line is waiting to be taken
    pub fn has_line(&self) -> bool {
        self.buffer[..self.len].contains(&b'\n')
    }

    /// Append received bytes
    ///
    /// While the tail of an overlong line is being dropped, bytes up to and
    /// including the next `\n` are consumed without being stored.
    ///
    /// # Returns
    /// The number of bytes consumed. Callers should size reads with
    /// [`LineBuffer::remaining`] so nothing is refused.
    pub fn extend(&mut self, bytes: &[u8]) -> usize {
        let mut skipped = 0;
        let mut bytes = bytes;
        if self.discarding {
            match bytes.iter().position(|&b| b == b'\n') {
                Some(end) => {
                    self.discarding = false;
                    skipped = end + 1;
                    bytes = &bytes[end + 1..];
                }
                None => return bytes.len(),
            }
        }

        let n = bytes.len().min(self.remaining());
        self.buffer[self.len..self.len + n].copy_from_slice(&bytes[..n]);
        self.len += n;
        skipped + n
    }

    /// Take the oldest complete line, without its terminator
    ///
    /// Returns `Ok(None)` while no terminator has arrived. A full buffer
    /// without a terminator is cleared and reported as
    /// [`LineError::Overflow`]; the rest of that line is then dropped as it
    /// arrives.
    pub fn take_line(&mut self) -> Result<Option<String<MAX_LINE_SIZE>>, LineError> {
        let Some(end) = self.buffer[..self.len].iter().position(|&b| b == b'\n') else {
            if self.len == LINE_BUFFER_SIZE {
                self.clear();
                self.discarding = true;
                return Err(LineError::Overflow);
            }
            return Ok(None);
        };

        let mut content = &self.buffer[..end];
        if let [rest @ .., b'\r'] = content {
            content = rest;
        }
        let line = if content.len() > MAX_LINE_SIZE {
            Err(LineError::Overflow)
        } else {
            core::str::from_utf8(content)
                .ok()
                .and_then(|text| String::try_from(text).ok())
                .ok_or(LineError::InvalidUtf8)
        };

        self.consume(end + 1);
        line.map(Some)
    }

    fn consume(&mut self, count: usize) {
        self.buffer.copy_within(count..self.len, 0);
        self.len -= count;
    }
}
