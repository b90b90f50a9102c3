//! The command dispatcher

use core::fmt;

use log::{info, warn};
use pinlink_hal::{PinDriver, SystemControl};
use pinlink_protocol::{Command, ConfigCommand, PinId, ResultCode};

use super::configure;
use super::CommandSink;
use crate::config::ConfigStore;
use crate::pins::PinRegistry;

/// Executes commands against borrowed device state
///
/// A dispatcher is built for the duration of one tick step; it owns
/// nothing and every effect lands in the store, the registry or the system.
pub struct Dispatcher<'a, D: PinDriver, S: SystemControl> {
    store: &'a mut ConfigStore,
    pins: &'a mut PinRegistry<D>,
    system: &'a mut S,
}

impl<'a, D: PinDriver, S: SystemControl> Dispatcher<'a, D, S> {
    /// Create a dispatcher over the given state
    pub fn new(
        store: &'a mut ConfigStore,
        pins: &'a mut PinRegistry<D>,
        system: &'a mut S,
    ) -> Self {
        Self {
            store,
            pins,
            system,
        }
    }

    /// Configuration store
    pub fn store(&self) -> &ConfigStore {
        &*self.store
    }

    /// Pin registry
    pub fn pins(&self) -> &PinRegistry<D> {
        &*self.pins
    }

    fn read(&mut self, tokens: &[&str]) -> ResultCode {
        let Some(name) = tokens.get(1) else {
            return ResultCode::Read;
        };
        let pin = PinId::resolve(name);
        match self.pins.read(pin) {
            Ok(value) => {
                info!("{} = {}", pin.name(), value);
                ResultCode::Success
            }
            Err(code) => code,
        }
    }

    fn write(&mut self, tokens: &[&str]) -> ResultCode {
        let (Some(name), Some(value)) = (tokens.get(1), tokens.get(2)) else {
            return ResultCode::Write;
        };
        let pin = PinId::resolve(name);
        if pin == PinId::Unknown {
            return ResultCode::PinUnknown;
        }
        if pin.is_analog() {
            return ResultCode::PinReadOnly;
        }
        let Ok(value) = value.parse::<i32>() else {
            return ResultCode::Write;
        };
        match self.pins.write(pin, value) {
            Ok(()) => {
                info!("{} <- {}", pin.name(), value);
                ResultCode::Success
            }
            Err(code) => code,
        }
    }
}

impl<D: PinDriver, S: SystemControl> CommandSink for Dispatcher<'_, D, S> {
    fn execute(&mut self, tokens: &[&str]) -> ResultCode {
        let Some(first) = tokens.first() else {
            return ResultCode::Failed;
        };
        info!("execute: {}", CommandLine(tokens));

        match Command::resolve(first) {
            Command::Reset => {
                info!("reset requested");
                self.system.reset();
                ResultCode::Success
            }
            Command::Config => configure::run(self.store, self.pins, tokens),
            Command::Read => self.read(tokens),
            Command::Write => self.write(tokens),
            Command::Unknown => {
                warn!("unknown command '{}'", first);
                ResultCode::Success
            }
        }
    }
}

/// Log rendering of a command with the passphrase masked
struct CommandLine<'a>(&'a [&'a str]);

impl fmt::Display for CommandLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secret = self.0.len() > 2
            && Command::resolve(self.0[0]) == Command::Config
            && ConfigCommand::resolve(self.0[1]) == ConfigCommand::Password;
        for (i, token) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            if secret && i == 2 {
                f.write_str("********")?;
            } else {
                f.write_str(token)?;
            }
        }
        Ok(())
    }
}
