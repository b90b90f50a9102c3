//! `config` sub-commands
//!
//! Field values are validated before the store is touched, so a rejected
//! value leaves both the field and the dirty flag as they were.

use log::{info, warn};
use pinlink_hal::PinDriver;
use pinlink_protocol::{ConfigCommand, PinDirection, PinId, ResultCode};

use crate::config::{
    parse_ipv4, parse_positive, parse_text, ConfigStore, MAX_PASSWORD_LEN, MAX_SSID_LEN,
};
use crate::pins::PinRegistry;

/// Execute `config <sub-command> ...`
pub(super) fn run<D: PinDriver>(
    store: &mut ConfigStore,
    pins: &mut PinRegistry<D>,
    tokens: &[&str],
) -> ResultCode {
    let Some(sub) = tokens.get(1) else {
        return ResultCode::Config;
    };

    match ConfigCommand::resolve(sub) {
        ConfigCommand::Show => {
            show(store, pins);
            ResultCode::Success
        }
        ConfigCommand::Pin => configure_pin(store, pins, tokens),
        ConfigCommand::Unknown => {
            warn!("unknown config field '{}'", sub);
            ResultCode::Config
        }
        field => {
            let Some(value) = tokens.get(2) else {
                return ResultCode::Config;
            };
            match apply_field(store, field, value) {
                Ok(()) => {
                    info!("{} updated", field.keyword());
                    ResultCode::Success
                }
                Err(code) => code,
            }
        }
    }
}

fn configure_pin<D: PinDriver>(
    store: &mut ConfigStore,
    pins: &mut PinRegistry<D>,
    tokens: &[&str],
) -> ResultCode {
    let (Some(pin), Some(direction)) = (tokens.get(2), tokens.get(3)) else {
        return ResultCode::Config;
    };
    let pin = PinId::resolve(pin);
    let direction = PinDirection::resolve(direction);

    if let Err(code) = pins.configure(pin, direction) {
        return code;
    }
    if let Some(index) = pin.digital_index() {
        store.update(|record| record.pin_modes[index] = direction);
    }
    ResultCode::Success
}

fn apply_field(store: &mut ConfigStore, field: ConfigCommand, value: &str) -> Result<(), ResultCode> {
    let invalid = ResultCode::config_field(field);
    let address = |value: &str| parse_ipv4(value).ok_or(invalid);

    match field {
        ConfigCommand::Ssid => {
            let ssid = parse_text::<MAX_SSID_LEN>(value)
                .filter(|ssid| !ssid.is_empty())
                .ok_or(invalid)?;
            store.update(|record| record.ssid = ssid);
        }
        ConfigCommand::Password => {
            let password = parse_text::<MAX_PASSWORD_LEN>(value).ok_or(invalid)?;
            store.update(|record| record.password = password);
        }
        ConfigCommand::Ip => {
            let ip = address(value)?;
            store.update(|record| record.ip = ip);
        }
        ConfigCommand::Subnet => {
            let subnet = address(value)?;
            store.update(|record| record.subnet = subnet);
        }
        ConfigCommand::Gateway => {
            let gateway = address(value)?;
            store.update(|record| record.gateway = gateway);
        }
        ConfigCommand::Dns1 => {
            let dns = address(value)?;
            store.update(|record| record.dns1 = dns);
        }
        ConfigCommand::Dns2 => {
            let dns = address(value)?;
            store.update(|record| record.dns2 = dns);
        }
        ConfigCommand::TcpPort => {
            let port = parse_positive::<u16>(value).ok_or(invalid)?;
            store.update(|record| record.tcp_port = port);
        }
        ConfigCommand::HttpPort => {
            let port = parse_positive::<u16>(value).ok_or(invalid)?;
            store.update(|record| record.http_port = port);
        }
        ConfigCommand::MaxClients => {
            let limit = parse_positive::<u16>(value).ok_or(invalid)?;
            store.update(|record| record.max_clients = limit);
        }
        ConfigCommand::Timeout => {
            let timeout = parse_positive::<u32>(value).ok_or(invalid)?;
            store.update(|record| record.inactivity_timeout_ms = timeout);
        }
        ConfigCommand::Show | ConfigCommand::Pin | ConfigCommand::Unknown => {
            return Err(ResultCode::Config)
        }
    }
    Ok(())
}

fn show<D: PinDriver>(store: &ConfigStore, pins: &PinRegistry<D>) {
    info!("configuration:\n{}", store.record());
    for entry in pins.entries() {
        info!(
            "  {}: {} (last value {})",
            entry.name(),
            entry.mode.name(),
            entry.value
        );
    }
    if store.is_dirty() {
        info!("  (unsaved changes)");
    }
}
