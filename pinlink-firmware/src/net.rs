//! `std::net` transports
//!
//! Listeners and streams are non-blocking so the tick loop never waits on a
//! client. Writes temporarily switch a stream to blocking mode with a
//! timeout, since responses are small and must go out whole.

use std::io::{self, Read as _, Write as _};
use std::net::{IpAddr, Shutdown, SocketAddr, TcpListener, TcpStream};
use std::time::Duration;

use log::{debug, info, warn};
use pinlink_hal::{Listener, NetError, StaticIp, Stream, WifiRadio};

/// Upper bound for one blocking write
const WRITE_TIMEOUT: Duration = Duration::from_secs(2);

/// Non-blocking TCP listener that can move to another port
#[derive(Debug)]
pub struct StdListener {
    bind: IpAddr,
    socket: Option<(u16, TcpListener)>,
}

impl StdListener {
    /// Create a listener for `bind`; nothing is bound until `listen`
    pub fn new(bind: IpAddr) -> Self {
        Self { bind, socket: None }
    }

    /// Address actually bound, if listening
    #[cfg(test)]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket
            .as_ref()
            .and_then(|(_, socket)| socket.local_addr().ok())
    }
}

impl Listener for StdListener {
    type Stream = StdStream;

    fn listen(&mut self, port: u16) -> Result<(), NetError> {
        if matches!(self.socket, Some((bound, _)) if bound == port) {
            return Ok(());
        }
        let socket = TcpListener::bind((self.bind, port)).map_err(|error| {
            warn!("bind {}:{} failed: {}", self.bind, port, error);
            NetError::Bind
        })?;
        socket.set_nonblocking(true).map_err(|_| NetError::Bind)?;
        info!("listening on {}", SocketAddr::new(self.bind, port));
        self.socket = Some((port, socket));
        Ok(())
    }

    fn accept(&mut self) -> Option<StdStream> {
        let (_, socket) = self.socket.as_ref()?;
        match socket.accept() {
            Ok((stream, peer)) => match StdStream::new(stream) {
                Ok(stream) => {
                    debug!("connection from {}", peer);
                    Some(stream)
                }
                Err(error) => {
                    warn!("cannot configure connection from {}: {}", peer, error);
                    None
                }
            },
            Err(error) if error.kind() == io::ErrorKind::WouldBlock => None,
            Err(error) => {
                warn!("accept failed: {}", error);
                None
            }
        }
    }
}

/// Connected TCP stream
#[derive(Debug)]
pub struct StdStream {
    stream: TcpStream,
}

impl StdStream {
    fn new(stream: TcpStream) -> io::Result<Self> {
        stream.set_nonblocking(true)?;
        stream.set_write_timeout(Some(WRITE_TIMEOUT))?;
        stream.set_nodelay(true)?;
        Ok(Self { stream })
    }
}

impl embedded_io::ErrorType for StdStream {
    type Error = NetError;
}

impl embedded_io::ReadReady for StdStream {
    fn read_ready(&mut self) -> Result<bool, NetError> {
        let mut probe = [0u8; 1];
        match self.stream.peek(&mut probe) {
            // Zero bytes means the peer closed; `read` will report it
            Ok(_) => Ok(true),
            Err(error) if error.kind() == io::ErrorKind::WouldBlock => Ok(false),
            Err(_) => Err(NetError::Io),
        }
    }
}

impl embedded_io::Read for StdStream {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, NetError> {
        self.stream.read(buf).map_err(|_| NetError::Io)
    }
}

impl embedded_io::Write for StdStream {
    fn write(&mut self, buf: &[u8]) -> Result<usize, NetError> {
        self.stream.set_nonblocking(false).map_err(|_| NetError::Io)?;
        let written = self.stream.write(buf);
        self.stream.set_nonblocking(true).map_err(|_| NetError::Io)?;
        written.map_err(|_| NetError::Io)
    }

    fn flush(&mut self) -> Result<(), NetError> {
        self.stream.flush().map_err(|_| NetError::Io)
    }
}

impl Stream for StdStream {
    fn close(&mut self) {
        // Fails if the peer already went away
        let _ = self.stream.shutdown(Shutdown::Both);
    }
}

/// The host is always on the network
#[derive(Debug, Default)]
pub struct HostRadio;

impl WifiRadio for HostRadio {
    fn is_connected(&mut self) -> bool {
        true
    }

    fn configure(&mut self, addressing: &StaticIp) -> Result<(), NetError> {
        debug!("ignoring static addressing {:?}", addressing);
        Ok(())
    }

    fn begin(&mut self, ssid: &str, _password: &str) {
        debug!("ignoring association with '{}'", ssid);
    }
}
