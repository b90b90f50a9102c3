//! Pin registry
//!
//! Maps the fixed set of logical pins to GPIO numbers and tracks their
//! direction and last observed value.

pub mod registry;

pub use registry::*;
