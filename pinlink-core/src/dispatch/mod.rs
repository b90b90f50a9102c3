//! Command dispatch
//!
//! Turns a token vector into effects on the configuration store and the pin
//! registry. Transports only see the [`CommandSink`] capability.

mod configure;
pub mod dispatcher;

pub use dispatcher::*;

use pinlink_protocol::ResultCode;

/// Something that executes tokenized commands
///
/// The session pool and the HTTP server receive a sink at call time instead
/// of holding a reference to the dispatcher.
pub trait CommandSink {
    /// Execute one command
    fn execute(&mut self, tokens: &[&str]) -> ResultCode;
}
