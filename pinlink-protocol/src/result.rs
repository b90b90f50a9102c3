//! Result codes
//!
//! Every dispatch returns one [`ResultCode`]. Codes are composed from a
//! family marker and a sub-identifier:
//!
//! | Family     | Marker   | Sub-identifier                 |
//! |------------|----------|--------------------------------|
//! | config     | `0xF000` | config sub-command code        |
//! | pin        | `0xFA00` | `0x0A` for A0, `0xFD..=0xFF`   |
//! | transport  | `0xFC00` | protocol code (`0xC1..`)       |
//! | read       | `0x2F00` |                                |
//! | write      | `0x3F00` |                                |
//!
//! The values travel over HTTP as decimal text and must never change.

use crate::keywords::{ConfigCommand, PinId, Protocol};
use core::fmt;

const CONFIG_FAMILY: u16 = 0xF000;
const PIN_FAMILY: u16 = 0xFA00;
const TRANSPORT_FAMILY: u16 = 0xFC00;

/// Outcome of a dispatched command or a transport step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum ResultCode {
    Success = 0x0000,
    /// Generic failure (empty command, unclassified error)
    Failed = 0xFFFF,

    /// Generic configuration error (missing argument, unknown field)
    Config = CONFIG_FAMILY,
    ConfigPin = CONFIG_FAMILY | 0x0100,
    ConfigSsid = CONFIG_FAMILY | 0x0200,
    ConfigPassword = CONFIG_FAMILY | 0x0300,
    ConfigIp = CONFIG_FAMILY | 0x0400,
    ConfigSubnet = CONFIG_FAMILY | 0x0500,
    ConfigGateway = CONFIG_FAMILY | 0x0600,
    ConfigDns1 = CONFIG_FAMILY | 0x0700,
    ConfigDns2 = CONFIG_FAMILY | 0x0800,
    ConfigTcpPort = CONFIG_FAMILY | 0x0900,
    ConfigHttpPort = CONFIG_FAMILY | 0x0A00,
    ConfigMaxClients = CONFIG_FAMILY | 0x0B00,
    ConfigTimeout = CONFIG_FAMILY | 0x0C00,
    /// The configuration record could not be written
    ConfigStorage = CONFIG_FAMILY | 0x00FE,
    /// The persisted configuration record could not be parsed
    ConfigCorrupt = CONFIG_FAMILY | 0x00FF,

    /// Pin name did not resolve
    PinUnknown = PIN_FAMILY | 0x00FF,
    /// Direction keyword was neither `input` nor `output`
    PinDirection = PIN_FAMILY | 0x00FE,
    /// Read or write on a pin whose direction is unset
    PinNotConfigured = PIN_FAMILY | 0x00FD,
    /// Write to the analog input
    PinReadOnly = PIN_FAMILY | PinId::A0 as u16,

    Http = TRANSPORT_FAMILY | Protocol::Http as u16,
    Tcp = TRANSPORT_FAMILY | Protocol::Tcp as u16,
    Serial = TRANSPORT_FAMILY | Protocol::Serial as u16,
    WifiConfig = TRANSPORT_FAMILY | 0x00C4,
    WifiConnection = TRANSPORT_FAMILY | 0x00C5,
    ClientDisconnected = TRANSPORT_FAMILY | 0x00CD,

    /// `read` without a pin argument
    Read = 0x2F00,
    /// `write` without enough arguments or with a non-numeric value
    Write = 0x3F00,
}

/// Result code family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResultFamily {
    Success,
    Generic,
    Config,
    Pin,
    Transport,
    Read,
    Write,
}

impl ResultCode {
    const ALL: [ResultCode; 29] = [
        ResultCode::Success,
        ResultCode::Failed,
        ResultCode::Config,
        ResultCode::ConfigPin,
        ResultCode::ConfigSsid,
        ResultCode::ConfigPassword,
        ResultCode::ConfigIp,
        ResultCode::ConfigSubnet,
        ResultCode::ConfigGateway,
        ResultCode::ConfigDns1,
        ResultCode::ConfigDns2,
        ResultCode::ConfigTcpPort,
        ResultCode::ConfigHttpPort,
        ResultCode::ConfigMaxClients,
        ResultCode::ConfigTimeout,
        ResultCode::ConfigStorage,
        ResultCode::ConfigCorrupt,
        ResultCode::PinUnknown,
        ResultCode::PinDirection,
        ResultCode::PinNotConfigured,
        ResultCode::PinReadOnly,
        ResultCode::Http,
        ResultCode::Tcp,
        ResultCode::Serial,
        ResultCode::WifiConfig,
        ResultCode::WifiConnection,
        ResultCode::ClientDisconnected,
        ResultCode::Read,
        ResultCode::Write,
    ];

    /// Stable numeric value
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Look up a code by its numeric value
    pub fn from_code(code: u16) -> Option<Self> {
        Self::ALL.iter().copied().find(|result| result.code() == code)
    }

    /// Check if this is [`ResultCode::Success`]
    pub fn is_success(self) -> bool {
        self == ResultCode::Success
    }

    /// Validation error for a `config` field
    ///
    /// `show` and unresolved sub-commands map to the generic
    /// [`ResultCode::Config`].
    pub fn config_field(field: ConfigCommand) -> Self {
        match field {
            ConfigCommand::Pin => ResultCode::ConfigPin,
            ConfigCommand::Ssid => ResultCode::ConfigSsid,
            ConfigCommand::Password => ResultCode::ConfigPassword,
            ConfigCommand::Ip => ResultCode::ConfigIp,
            ConfigCommand::Subnet => ResultCode::ConfigSubnet,
            ConfigCommand::Gateway => ResultCode::ConfigGateway,
            ConfigCommand::Dns1 => ResultCode::ConfigDns1,
            ConfigCommand::Dns2 => ResultCode::ConfigDns2,
            ConfigCommand::TcpPort => ResultCode::ConfigTcpPort,
            ConfigCommand::HttpPort => ResultCode::ConfigHttpPort,
            ConfigCommand::MaxClients => ResultCode::ConfigMaxClients,
            ConfigCommand::Timeout => ResultCode::ConfigTimeout,
            ConfigCommand::Show | ConfigCommand::Unknown => ResultCode::Config,
        }
    }

    /// Transport error for a protocol
    pub fn transport(protocol: Protocol) -> Self {
        match protocol {
            Protocol::Http => ResultCode::Http,
            Protocol::Tcp => ResultCode::Tcp,
            Protocol::Serial => ResultCode::Serial,
            Protocol::Unknown => ResultCode::Failed,
        }
    }

    /// Family this code belongs to
    pub fn family(self) -> ResultFamily {
        match self {
            ResultCode::Success => ResultFamily::Success,
            ResultCode::Failed => ResultFamily::Generic,
            ResultCode::Read => ResultFamily::Read,
            ResultCode::Write => ResultFamily::Write,
            ResultCode::PinUnknown
            | ResultCode::PinDirection
            | ResultCode::PinNotConfigured
            | ResultCode::PinReadOnly => ResultFamily::Pin,
            ResultCode::Http
            | ResultCode::Tcp
            | ResultCode::Serial
            | ResultCode::WifiConfig
            | ResultCode::WifiConnection
            | ResultCode::ClientDisconnected => ResultFamily::Transport,
            _ => ResultFamily::Config,
        }
    }

    /// Short human-readable name
    pub fn name(self) -> &'static str {
        match self {
            ResultCode::Success => "success",
            ResultCode::Failed => "failed",
            ResultCode::Config => "config error",
            ResultCode::ConfigPin => "invalid pin config",
            ResultCode::ConfigSsid => "invalid ssid",
            ResultCode::ConfigPassword => "invalid password",
            ResultCode::ConfigIp => "invalid ip",
            ResultCode::ConfigSubnet => "invalid subnet",
            ResultCode::ConfigGateway => "invalid gateway",
            ResultCode::ConfigDns1 => "invalid dns1",
            ResultCode::ConfigDns2 => "invalid dns2",
            ResultCode::ConfigTcpPort => "invalid tcp port",
            ResultCode::ConfigHttpPort => "invalid http port",
            ResultCode::ConfigMaxClients => "invalid max clients",
            ResultCode::ConfigTimeout => "invalid timeout",
            ResultCode::ConfigStorage => "config not saved",
            ResultCode::ConfigCorrupt => "config corrupt",
            ResultCode::PinUnknown => "unknown pin",
            ResultCode::PinDirection => "invalid direction",
            ResultCode::PinNotConfigured => "pin not configured",
            ResultCode::PinReadOnly => "analog pin is read-only",
            ResultCode::Http => "http error",
            ResultCode::Tcp => "tcp error",
            ResultCode::Serial => "serial error",
            ResultCode::WifiConfig => "wifi config error",
            ResultCode::WifiConnection => "wifi connection error",
            ResultCode::ClientDisconnected => "client disconnected",
            ResultCode::Read => "read error",
            ResultCode::Write => "write error",
        }
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:04X})", self.name(), self.code())
    }
}
