//! Non-blocking line input
//!
//! Shared by the console and the socket sessions: pull whatever bytes are
//! ready into a [`LineBuffer`] and hand out at most one line per poll.

use embedded_io::{Read, ReadReady};
use heapless::String;
use pinlink_protocol::{LineBuffer, LineError, LINE_BUFFER_SIZE, MAX_LINE_SIZE};

/// Outcome of one poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinePoll {
    /// A complete line, terminator stripped
    Line(String<MAX_LINE_SIZE>),
    /// Nothing complete yet
    Pending,
    /// Buffered input was discarded
    Dropped(LineError),
    /// The peer closed the stream or reading failed
    Closed,
}

/// Poll `reader` for one line
///
/// Reads only when no complete line is already buffered, so a chatty peer
/// is served one line per poll and never overruns the buffer.
pub fn poll_line<R: Read + ReadReady>(reader: &mut R, buffer: &mut LineBuffer) -> LinePoll {
    if !buffer.has_line() && buffer.remaining() > 0 {
        match reader.read_ready() {
            Ok(true) => {
                let mut chunk = [0u8; LINE_BUFFER_SIZE];
                let room = buffer.remaining();
                match reader.read(&mut chunk[..room]) {
                    Ok(0) | Err(_) => return LinePoll::Closed,
                    Ok(n) => {
                        buffer.extend(&chunk[..n]);
                    }
                }
            }
            Ok(false) => {}
            Err(_) => return LinePoll::Closed,
        }
    }

    match buffer.take_line() {
        Ok(Some(line)) => LinePoll::Line(line),
        Ok(None) => LinePoll::Pending,
        Err(error) => LinePoll::Dropped(error),
    }
}
