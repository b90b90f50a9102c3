//! Socket session management
//!
//! A bounded pool of line-oriented client connections, serviced once per
//! tick and evicted after a period of inactivity.

pub mod pool;
pub mod state;

pub use pool::*;
pub use state::*;
