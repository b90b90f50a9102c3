//! GPIO pin abstractions
//!
//! Pins are addressed by their raw GPIO number. The logical pin names
//! (A0, D0..D8) are mapped to GPIO numbers by the core's pin registry.

/// Pin direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Input,
    Output,
}

/// GPIO bank driver
///
/// Implementations perform the register access for one chip. None of the
/// operations can fail at this level; invalid pin numbers are a board
/// wiring error the registry never produces.
pub trait PinDriver {
    /// Set the direction of a pin
    fn set_direction(&mut self, gpio: u8, direction: Direction);

    /// Read the logic level of a digital pin
    ///
    /// # Returns
    /// `true` when the pin reads high
    fn read_digital(&mut self, gpio: u8) -> bool;

    /// Sample the analog input
    ///
    /// # Returns
    /// The raw ADC reading (0..=1023 on the ESP8266)
    fn read_analog(&mut self, gpio: u8) -> u16;

    /// Drive an output pin
    fn write_digital(&mut self, gpio: u8, high: bool);
}
