//! Board-agnostic core logic for the pin control firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Configuration record, defaults and persistence
//! - Pin registry (logical pin names to GPIO, direction, last value)
//! - Command dispatcher and the `config` sub-commands
//! - Socket session pool with inactivity eviction
//! - Wi-Fi link retry policy
//! - HTTP control panel (request parsing, routes, connection handling)
//! - The cooperative device tick tying it together
//!
//! Everything runs on a single thread. Each [`device::Device::tick`] polls
//! every transport once and never blocks except for the bounded Wi-Fi
//! association wait.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod device;
pub mod dispatch;
pub mod http;
pub mod input;
pub mod link;
pub mod pins;
pub mod session;

#[cfg(test)]
pub(crate) mod mock;

pub use config::{ConfigRecord, ConfigStore};
pub use device::Device;
pub use dispatch::{CommandSink, Dispatcher};
pub use pins::PinRegistry;
pub use session::SessionManager;
