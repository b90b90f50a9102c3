//! System services: monotonic clock, blocking delay and reset

/// Clock, delay and reset for one platform
pub trait SystemControl {
    /// Milliseconds since boot
    ///
    /// Must be monotonic; callers use saturating arithmetic, so a
    /// wrapping source must be widened by the implementation.
    fn now_ms(&self) -> u64;

    /// Block for `ms` milliseconds
    fn delay_ms(&mut self, ms: u32);

    /// Restart the device
    ///
    /// On hardware this does not return. Simulated platforms may record the
    /// request and let the caller rebuild its state.
    fn reset(&mut self);
}
