//! Pinlink Hardware Abstraction Layer
//!
//! This crate defines the platform capabilities the Pinlink core consumes.
//! A board crate implements them once, and the same command engine runs on
//! the real module or on a host simulation.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  pinlink-core (Device, Dispatcher, ...) │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  pinlink-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ host runtime  │       │  board crate  │
//! │ (std sockets) │       │   (ESP8266)   │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::PinDriver`] - Direction control, digital and analog I/O
//! - [`storage::FileStorage`] - Path-addressed persistent files
//! - [`net::Listener`], [`net::Stream`] - Non-blocking stream server
//! - [`net::WifiRadio`] - Station association
//! - [`system::SystemControl`] - Clock, delay and reset
//! - [`Platform`] - Bundles one board's implementations

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod net;
pub mod storage;
pub mod system;

// Re-export key traits at crate root for convenience
pub use gpio::{Direction, PinDriver};
pub use net::{Listener, NetError, StaticIp, Stream, WifiRadio};
pub use storage::{FileStorage, StorageError};
pub use system::SystemControl;

/// One board's set of capability implementations
///
/// The core is generic over a single `Platform` type instead of a long list
/// of type parameters.
pub trait Platform {
    /// GPIO bank
    type Pins: PinDriver;
    /// Persistent file storage
    type Storage: FileStorage;
    /// Wi-Fi station interface
    type Radio: WifiRadio;
    /// Listener used for both the raw socket and the HTTP server
    type Listener: Listener;
    /// Console byte source (UART or stdin)
    type Console: embedded_io::Read + embedded_io::ReadReady;
    /// Clock, delay and reset
    type System: SystemControl;
}

/// Owned capability instances handed to the device at startup
pub struct Board<P: Platform> {
    pub pins: P::Pins,
    pub storage: P::Storage,
    pub radio: P::Radio,
    /// Listener for line-oriented socket sessions
    pub tcp: P::Listener,
    /// Listener for the HTTP control panel
    pub http: P::Listener,
    pub console: P::Console,
    pub system: P::System,
}
