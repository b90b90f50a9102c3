//! Standard input console
//!
//! Stdin has no portable non-blocking mode, so a reader thread forwards
//! chunks over a channel and the tick loop drains it without waiting.

use std::collections::VecDeque;
use std::convert::Infallible;
use std::io::{self, Read};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use log::debug;

const READ_CHUNK: usize = 128;

/// Console fed by a background stdin reader
#[derive(Debug)]
pub struct StdinConsole {
    chunks: Receiver<Vec<u8>>,
    pending: VecDeque<u8>,
    closed: bool,
}

impl StdinConsole {
    /// Start the reader thread
    pub fn spawn() -> io::Result<Self> {
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("console".into())
            .spawn(move || {
                let mut stdin = io::stdin().lock();
                let mut buf = [0u8; READ_CHUNK];
                loop {
                    match stdin.read(&mut buf) {
                        Ok(0) | Err(_) => break,
                        Ok(n) => {
                            if tx.send(buf[..n].to_vec()).is_err() {
                                break;
                            }
                        }
                    }
                }
                debug!("stdin closed");
            })?;
        Ok(Self::from_channel(rx))
    }

    /// Console over an existing chunk channel
    pub fn from_channel(chunks: Receiver<Vec<u8>>) -> Self {
        Self {
            chunks,
            pending: VecDeque::new(),
            closed: false,
        }
    }

    fn drain(&mut self) {
        loop {
            match self.chunks.try_recv() {
                Ok(chunk) => self.pending.extend(chunk),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.closed = true;
                    break;
                }
            }
        }
    }
}

impl embedded_io::ErrorType for StdinConsole {
    type Error = Infallible;
}

impl embedded_io::ReadReady for StdinConsole {
    fn read_ready(&mut self) -> Result<bool, Infallible> {
        self.drain();
        Ok(!self.pending.is_empty() || self.closed)
    }
}

impl embedded_io::Read for StdinConsole {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Infallible> {
        self.drain();
        let n = buf.len().min(self.pending.len());
        for (slot, byte) in buf.iter_mut().zip(self.pending.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_io::{Read as _, ReadReady as _};

    #[test]
    fn test_chunks_are_joined() {
        let (tx, rx) = mpsc::channel();
        let mut console = StdinConsole::from_channel(rx);
        assert_eq!(console.read_ready(), Ok(false));

        tx.send(b"read ".to_vec()).unwrap();
        tx.send(b"A0\n".to_vec()).unwrap();
        assert_eq!(console.read_ready(), Ok(true));

        let mut buf = [0u8; 4];
        assert_eq!(console.read(&mut buf), Ok(4));
        assert_eq!(&buf, b"read");
        let mut rest = [0u8; 16];
        assert_eq!(console.read(&mut rest), Ok(4));
        assert_eq!(&rest[..4], b" A0\n");
    }

    #[test]
    fn test_closed_reads_zero() {
        let (tx, rx) = mpsc::channel::<Vec<u8>>();
        let mut console = StdinConsole::from_channel(rx);
        drop(tx);
        assert_eq!(console.read_ready(), Ok(true));
        let mut buf = [0u8; 4];
        assert_eq!(console.read(&mut buf), Ok(0));
    }
}
