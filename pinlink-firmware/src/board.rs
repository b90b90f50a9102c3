//! Host board
//!
//! Binds the HAL traits to the host: a simulated GPIO bank, the data
//! directory, `std::net` listeners, stdin and the process clock.

use std::io;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info};
use pinlink_hal::{Board, Direction, PinDriver, Platform, SystemControl};

use crate::console::StdinConsole;
use crate::net::{HostRadio, StdListener};
use crate::settings::RuntimeSettings;
use crate::storage::DirStorage;

/// Number of simulated GPIO lines (GPIO0..=GPIO17)
pub const GPIO_COUNT: usize = 18;

/// Simulated GPIO bank
///
/// Every line latches the last level written to it, so reading a pin back
/// returns what was written. The analog input holds a fixed sample.
#[derive(Debug, Clone)]
pub struct SimPins {
    directions: [Option<Direction>; GPIO_COUNT],
    levels: [bool; GPIO_COUNT],
    analog: u16,
}

impl Default for SimPins {
    fn default() -> Self {
        Self::new()
    }
}

impl SimPins {
    /// Create a bank with every line low and unconfigured
    pub fn new() -> Self {
        Self {
            directions: [None; GPIO_COUNT],
            levels: [false; GPIO_COUNT],
            analog: 0,
        }
    }

    /// Set the value returned by analog reads
    #[cfg(test)]
    pub fn set_analog(&mut self, value: u16) {
        self.analog = value;
    }

    /// Force the level of a line, as an external signal would
    pub fn set_level(&mut self, gpio: u8, high: bool) {
        if let Some(level) = self.levels.get_mut(usize::from(gpio)) {
            *level = high;
        }
    }

    /// Configured direction of a line
    #[cfg(test)]
    pub fn direction(&self, gpio: u8) -> Option<Direction> {
        self.directions.get(usize::from(gpio)).copied().flatten()
    }
}

impl PinDriver for SimPins {
    fn set_direction(&mut self, gpio: u8, direction: Direction) {
        if let Some(slot) = self.directions.get_mut(usize::from(gpio)) {
            *slot = Some(direction);
            debug!("gpio {} -> {:?}", gpio, direction);
        }
    }

    fn read_digital(&mut self, gpio: u8) -> bool {
        self.levels.get(usize::from(gpio)).copied().unwrap_or(false)
    }

    fn read_analog(&mut self, _gpio: u8) -> u16 {
        self.analog
    }

    fn write_digital(&mut self, gpio: u8, high: bool) {
        self.set_level(gpio, high);
        debug!("gpio {} = {}", gpio, u8::from(high));
    }
}

/// Process clock, sleep-based delay and a reset request flag
#[derive(Debug)]
pub struct HostSystem {
    started: Instant,
    reset_requested: bool,
}

impl Default for HostSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl HostSystem {
    /// Start the clock
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            reset_requested: false,
        }
    }

    /// Consume a pending reset request
    pub fn take_reset(&mut self) -> bool {
        core::mem::take(&mut self.reset_requested)
    }
}

impl SystemControl for HostSystem {
    fn now_ms(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    fn delay_ms(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis(u64::from(ms)));
    }

    fn reset(&mut self) {
        info!("reset requested");
        self.reset_requested = true;
    }
}

/// The host platform
pub struct HostPlatform;

impl Platform for HostPlatform {
    type Pins = SimPins;
    type Storage = DirStorage;
    type Radio = HostRadio;
    type Listener = StdListener;
    type Console = StdinConsole;
    type System = HostSystem;
}

/// Assemble the host board from the runtime settings
pub fn host_board(settings: &RuntimeSettings) -> io::Result<Board<HostPlatform>> {
    Ok(Board {
        pins: SimPins::new(),
        storage: DirStorage::open(&settings.data_dir)?,
        radio: HostRadio,
        tcp: StdListener::new(settings.bind),
        http: StdListener::new(settings.bind),
        console: StdinConsole::spawn()?,
        system: HostSystem::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_written_level_reads_back() {
        let mut pins = SimPins::new();
        pins.set_direction(5, Direction::Output);
        pins.write_digital(5, true);
        assert!(pins.read_digital(5));
        assert_eq!(pins.direction(5), Some(Direction::Output));
        assert_eq!(pins.direction(4), None);
    }

    #[test]
    fn test_out_of_range_lines_are_ignored() {
        let mut pins = SimPins::new();
        pins.write_digital(200, true);
        pins.set_direction(200, Direction::Input);
        assert!(!pins.read_digital(200));
        assert_eq!(pins.direction(200), None);
    }

    #[test]
    fn test_analog_sample() {
        let mut pins = SimPins::new();
        pins.set_analog(777);
        assert_eq!(pins.read_analog(17), 777);
    }

    #[test]
    fn test_reset_flag_is_consumed() {
        let mut system = HostSystem::new();
        assert!(!system.take_reset());
        system.reset();
        assert!(system.take_reset());
        assert!(!system.take_reset());
    }

    #[test]
    fn test_clock_advances_with_delay() {
        let mut system = HostSystem::new();
        let before = system.now_ms();
        system.delay_ms(5);
        assert!(system.now_ms() >= before + 5);
    }
}
