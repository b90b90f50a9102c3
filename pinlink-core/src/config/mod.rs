//! Configuration types
//!
//! The device configuration record and its persistence as a flat text file.

pub mod store;
pub mod types;

pub use store::*;
pub use types::*;
