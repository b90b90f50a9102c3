//! Network abstractions
//!
//! A non-blocking stream server and the Wi-Fi station interface. Streams
//! reuse the `embedded-io` traits so the same session code can sit on top
//! of lwIP, smoltcp or `std::net`.

use core::net::Ipv4Addr;

/// Errors from network operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NetError {
    /// Could not bind or listen on the requested port
    Bind,
    /// Peer closed the connection
    Closed,
    /// Read or write failed
    Io,
    /// The radio rejected the static address configuration
    Config,
}

impl embedded_io::Error for NetError {
    fn kind(&self) -> embedded_io::ErrorKind {
        embedded_io::ErrorKind::Other
    }
}

/// A connected duplex byte stream
///
/// `read_ready` must not block. `read` is only called after `read_ready`
/// returned `true`; a `read` of `0` bytes means the peer closed.
pub trait Stream:
    embedded_io::Read + embedded_io::ReadReady + embedded_io::Write
{
    /// Close the connection and release its socket
    fn close(&mut self);
}

/// Accepts incoming stream connections
pub trait Listener {
    /// Stream type produced by [`Listener::accept`]
    type Stream: Stream;

    /// Start listening on `port`
    ///
    /// Calling it again while already listening on the same port is a no-op.
    fn listen(&mut self, port: u16) -> Result<(), NetError>;

    /// Accept one pending connection without blocking
    fn accept(&mut self) -> Option<Self::Stream>;
}

/// Static station addressing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticIp {
    pub ip: Ipv4Addr,
    pub gateway: Ipv4Addr,
    pub subnet: Ipv4Addr,
    pub dns1: Ipv4Addr,
    pub dns2: Ipv4Addr,
}

/// Wi-Fi station interface
pub trait WifiRadio {
    /// Whether the station is associated and has its address
    fn is_connected(&mut self) -> bool;

    /// Apply static addressing before association
    fn configure(&mut self, addressing: &StaticIp) -> Result<(), NetError>;

    /// Start associating with an access point
    ///
    /// Returns immediately; progress is observed via [`WifiRadio::is_connected`].
    fn begin(&mut self, ssid: &str, password: &str);
}
