//! Pin registry implementation

use log::debug;
use pinlink_hal::{Direction, PinDriver};
use pinlink_protocol::{PinDirection, PinId, ResultCode};

use crate::config::DIGITAL_PIN_COUNT;

/// Number of logical pins (A0 plus D0..D8)
pub const PIN_COUNT: usize = 10;

/// NodeMCU v3 wiring: logical pin to GPIO number
pub const NODEMCU_PINOUT: [(PinId, u8); PIN_COUNT] = [
    (PinId::A0, 17),
    (PinId::D0, 16),
    (PinId::D1, 5),
    (PinId::D2, 4),
    (PinId::D3, 0),
    (PinId::D4, 2),
    (PinId::D5, 14),
    (PinId::D6, 12),
    (PinId::D7, 13),
    (PinId::D8, 15),
];

/// State of one logical pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinEntry {
    pub id: PinId,
    /// Physical GPIO number
    pub gpio: u8,
    pub mode: PinDirection,
    /// Result of the most recent successful read
    pub value: i32,
}

impl PinEntry {
    /// Display name (e.g. `D4`)
    pub fn name(&self) -> &'static str {
        self.id.name()
    }
}

/// Registry of all logical pins, owning the GPIO driver
///
/// Entries are created once. A0 is the ADC and always an input; the
/// digital pins start unset and accept neither reads nor writes until a
/// direction is configured.
pub struct PinRegistry<D: PinDriver> {
    driver: D,
    entries: [PinEntry; PIN_COUNT],
}

impl<D: PinDriver> PinRegistry<D> {
    /// Create a registry with the NodeMCU pinout
    pub fn new(driver: D) -> Self {
        Self::with_pinout(driver, NODEMCU_PINOUT)
    }

    /// Create a registry with a custom pinout
    ///
    /// Every entry of `pinout` must name a distinct pin.
    pub fn with_pinout(driver: D, pinout: [(PinId, u8); PIN_COUNT]) -> Self {
        let entries = pinout.map(|(id, gpio)| PinEntry {
            id,
            gpio,
            mode: if id.is_analog() {
                PinDirection::Input
            } else {
                PinDirection::NotSet
            },
            value: 0,
        });
        Self { driver, entries }
    }

    /// All entries, A0 first
    pub fn entries(&self) -> &[PinEntry] {
        &self.entries
    }

    /// Look up a pin
    pub fn entry(&self, pin: PinId) -> Option<&PinEntry> {
        self.entries.iter().find(|entry| entry.id == pin)
    }

    /// Last read value of a pin
    pub fn value(&self, pin: PinId) -> Option<i32> {
        self.entry(pin).map(|entry| entry.value)
    }

    /// Current direction of a pin
    pub fn mode(&self, pin: PinId) -> Option<PinDirection> {
        self.entry(pin).map(|entry| entry.mode)
    }

    /// GPIO driver
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Mutable access to the GPIO driver
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Give back the GPIO driver
    pub fn into_driver(self) -> D {
        self.driver
    }

    fn entry_mut(&mut self, pin: PinId) -> Result<&mut PinEntry, ResultCode> {
        self.entries
            .iter_mut()
            .find(|entry| entry.id == pin)
            .ok_or(ResultCode::PinUnknown)
    }

    /// Set the direction of a pin
    ///
    /// # Errors
    /// - [`ResultCode::PinUnknown`] for an unresolved pin
    /// - [`ResultCode::PinDirection`] when `direction` is unset
    /// - [`ResultCode::PinReadOnly`] when asking for A0 as an output
    pub fn configure(&mut self, pin: PinId, direction: PinDirection) -> Result<(), ResultCode> {
        let hw_direction = match direction {
            PinDirection::Input => Direction::Input,
            PinDirection::Output => Direction::Output,
            PinDirection::NotSet => return Err(ResultCode::PinDirection),
        };
        let entry = self.entry_mut(pin)?;
        if pin.is_analog() {
            // The ADC has no direction register
            return match direction {
                PinDirection::Input => Ok(()),
                _ => Err(ResultCode::PinReadOnly),
            };
        }

        entry.mode = direction;
        let gpio = entry.gpio;
        self.driver.set_direction(gpio, hw_direction);
        debug!("{} (gpio {}) set to {}", pin.name(), gpio, direction.name());
        Ok(())
    }

    /// Apply persisted directions to the digital pins
    ///
    /// Unset entries are left alone.
    ///
    /// # Returns
    /// The number of pins configured
    pub fn restore(&mut self, modes: &[PinDirection; DIGITAL_PIN_COUNT]) -> usize {
        PinId::DIGITAL
            .iter()
            .zip(modes.iter())
            .filter(|(_, mode)| **mode != PinDirection::NotSet)
            .filter(|(pin, mode)| self.configure(**pin, **mode).is_ok())
            .count()
    }

    /// Sample a pin and remember the value
    ///
    /// A0 is read through the ADC, the digital pins as 0 or 1.
    pub fn read(&mut self, pin: PinId) -> Result<i32, ResultCode> {
        let entry = self
            .entries
            .iter_mut()
            .find(|entry| entry.id == pin)
            .ok_or(ResultCode::PinUnknown)?;
        if entry.mode == PinDirection::NotSet {
            return Err(ResultCode::PinNotConfigured);
        }

        entry.value = if pin.is_analog() {
            i32::from(self.driver.read_analog(entry.gpio))
        } else {
            i32::from(self.driver.read_digital(entry.gpio))
        };
        Ok(entry.value)
    }

    /// Drive a digital pin; any non-zero value means high
    pub fn write(&mut self, pin: PinId, value: i32) -> Result<(), ResultCode> {
        if pin.is_analog() {
            return Err(ResultCode::PinReadOnly);
        }
        let entry = self.entry_mut(pin)?;
        if entry.mode == PinDirection::NotSet {
            return Err(ResultCode::PinNotConfigured);
        }
        let gpio = entry.gpio;
        self.driver.write_digital(gpio, value != 0);
        Ok(())
    }
}
