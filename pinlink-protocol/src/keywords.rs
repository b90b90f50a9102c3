//! Keyword tables
//!
//! Each table maps a case-insensitive keyword to a closed enum. Lookup is
//! total: anything not in the table resolves to the enum's sentinel
//! variant, never to an error. The numeric codes are stable; result codes
//! and the persisted configuration record are built from them.

/// Resolve `token` against a static keyword table
fn lookup<T: Copy>(table: &[(&str, T)], token: &str, sentinel: T) -> T {
    table
        .iter()
        .find(|(keyword, _)| keyword.eq_ignore_ascii_case(token))
        .map(|&(_, value)| value)
        .unwrap_or(sentinel)
}

/// Top-level command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum Command {
    Reset = 0xA000,
    Config = 0x1000,
    Read = 0x2000,
    Write = 0x3000,
    Unknown = 0xFFFF,
}

impl Command {
    const TABLE: &'static [(&'static str, Command)] = &[
        ("reset", Command::Reset),
        ("config", Command::Config),
        ("read", Command::Read),
        ("write", Command::Write),
    ];

    /// Resolve a command keyword
    pub fn resolve(token: &str) -> Self {
        lookup(Self::TABLE, token, Command::Unknown)
    }

    /// Stable numeric code
    pub fn code(self) -> u16 {
        self as u16
    }
}

/// `config` sub-command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum ConfigCommand {
    Show = 0x0000,
    Pin = 0x0100,
    Ssid = 0x0200,
    Password = 0x0300,
    Ip = 0x0400,
    Subnet = 0x0500,
    Gateway = 0x0600,
    Dns1 = 0x0700,
    Dns2 = 0x0800,
    TcpPort = 0x0900,
    HttpPort = 0x0A00,
    MaxClients = 0x0B00,
    Timeout = 0x0C00,
    Unknown = 0xF000,
}

impl ConfigCommand {
    const TABLE: &'static [(&'static str, ConfigCommand)] = &[
        ("show", ConfigCommand::Show),
        ("pin", ConfigCommand::Pin),
        ("ssid", ConfigCommand::Ssid),
        ("password", ConfigCommand::Password),
        ("pwd", ConfigCommand::Password),
        ("ip", ConfigCommand::Ip),
        ("subnet", ConfigCommand::Subnet),
        ("gateway", ConfigCommand::Gateway),
        ("dns1", ConfigCommand::Dns1),
        ("dns2", ConfigCommand::Dns2),
        ("tcp-port", ConfigCommand::TcpPort),
        ("http-port", ConfigCommand::HttpPort),
        ("max-clients", ConfigCommand::MaxClients),
        ("timeout", ConfigCommand::Timeout),
    ];

    /// Resolve a `config` sub-command keyword
    pub fn resolve(token: &str) -> Self {
        lookup(Self::TABLE, token, ConfigCommand::Unknown)
    }

    /// Stable numeric code, also the field part of config result codes
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Canonical keyword
    pub fn keyword(self) -> &'static str {
        match self {
            ConfigCommand::Show => "show",
            ConfigCommand::Pin => "pin",
            ConfigCommand::Ssid => "ssid",
            ConfigCommand::Password => "password",
            ConfigCommand::Ip => "ip",
            ConfigCommand::Subnet => "subnet",
            ConfigCommand::Gateway => "gateway",
            ConfigCommand::Dns1 => "dns1",
            ConfigCommand::Dns2 => "dns2",
            ConfigCommand::TcpPort => "tcp-port",
            ConfigCommand::HttpPort => "http-port",
            ConfigCommand::MaxClients => "max-clients",
            ConfigCommand::Timeout => "timeout",
            ConfigCommand::Unknown => "?",
        }
    }
}

/// Pin direction mode
///
/// `NotSet` doubles as the table sentinel: any direction keyword other than
/// `input` or `output` leaves a pin unconfigured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum PinDirection {
    #[default]
    NotSet = 0x0000,
    Input = 0x0010,
    Output = 0x0020,
}

impl PinDirection {
    const TABLE: &'static [(&'static str, PinDirection)] = &[
        ("input", PinDirection::Input),
        ("output", PinDirection::Output),
    ];

    /// Resolve a direction keyword
    pub fn resolve(token: &str) -> Self {
        lookup(Self::TABLE, token, PinDirection::NotSet)
    }

    /// Stable numeric code, as stored in the configuration record
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Create a direction from its stored code
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0x0000 => Some(PinDirection::NotSet),
            0x0010 => Some(PinDirection::Input),
            0x0020 => Some(PinDirection::Output),
            _ => None,
        }
    }

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            PinDirection::NotSet => "unset",
            PinDirection::Input => "input",
            PinDirection::Output => "output",
        }
    }
}

/// Logical pin identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum PinId {
    D0 = 0x0000,
    D1 = 0x0001,
    D2 = 0x0002,
    D3 = 0x0003,
    D4 = 0x0004,
    D5 = 0x0005,
    D6 = 0x0006,
    D7 = 0x0007,
    D8 = 0x0008,
    A0 = 0x000A,
    Unknown = 0xFA00,
}

impl PinId {
    /// All resolvable pins, analog first, in display order
    pub const ALL: [PinId; 10] = [
        PinId::A0,
        PinId::D0,
        PinId::D1,
        PinId::D2,
        PinId::D3,
        PinId::D4,
        PinId::D5,
        PinId::D6,
        PinId::D7,
        PinId::D8,
    ];

    /// Digital pins in record order
    pub const DIGITAL: [PinId; 9] = [
        PinId::D0,
        PinId::D1,
        PinId::D2,
        PinId::D3,
        PinId::D4,
        PinId::D5,
        PinId::D6,
        PinId::D7,
        PinId::D8,
    ];

    const TABLE: &'static [(&'static str, PinId)] = &[
        ("A0", PinId::A0),
        ("D0", PinId::D0),
        ("D1", PinId::D1),
        ("D2", PinId::D2),
        ("D3", PinId::D3),
        ("D4", PinId::D4),
        ("D5", PinId::D5),
        ("D6", PinId::D6),
        ("D7", PinId::D7),
        ("D8", PinId::D8),
    ];

    /// Resolve a pin name
    pub fn resolve(token: &str) -> Self {
        lookup(Self::TABLE, token, PinId::Unknown)
    }

    /// Stable numeric code
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Canonical pin name
    pub fn name(self) -> &'static str {
        Self::TABLE
            .iter()
            .find(|&&(_, id)| id == self)
            .map(|&(name, _)| name)
            .unwrap_or("??")
    }

    /// Check if this is the analog input
    pub fn is_analog(self) -> bool {
        self == PinId::A0
    }

    /// Position within [`PinId::DIGITAL`], if this is a digital pin
    pub fn digital_index(self) -> Option<usize> {
        match self {
            PinId::A0 | PinId::Unknown => None,
            digital => Some(digital as usize),
        }
    }
}

/// Transport identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum Protocol {
    Http = 0x00C1,
    Tcp = 0x00C2,
    Serial = 0x00C3,
    Unknown = 0xFC00,
}

impl Protocol {
    const TABLE: &'static [(&'static str, Protocol)] = &[
        ("http", Protocol::Http),
        ("tcp", Protocol::Tcp),
        ("serial", Protocol::Serial),
    ];

    /// Resolve a transport keyword
    pub fn resolve(token: &str) -> Self {
        lookup(Self::TABLE, token, Protocol::Unknown)
    }

    /// Stable numeric code
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Canonical keyword
    pub fn name(self) -> &'static str {
        Self::TABLE
            .iter()
            .find(|&&(_, protocol)| protocol == self)
            .map(|&(name, _)| name)
            .unwrap_or("unknown")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_command_resolution() {
        assert_eq!(Command::resolve("reset"), Command::Reset);
        assert_eq!(Command::resolve("CONFIG"), Command::Config);
        assert_eq!(Command::resolve("Read"), Command::Read);
        assert_eq!(Command::resolve("wRiTe"), Command::Write);
        assert_eq!(Command::resolve("erase"), Command::Unknown);
        assert_eq!(Command::resolve(""), Command::Unknown);
    }

    #[test]
    fn test_config_command_password_alias() {
        assert_eq!(ConfigCommand::resolve("password"), ConfigCommand::Password);
        assert_eq!(ConfigCommand::resolve("PWD"), ConfigCommand::Password);
        assert_eq!(ConfigCommand::resolve("tcp-port"), ConfigCommand::TcpPort);
        assert_eq!(ConfigCommand::resolve("tcp_port"), ConfigCommand::Unknown);
    }

    #[test]
    fn test_direction_sentinel() {
        assert_eq!(PinDirection::resolve("Output"), PinDirection::Output);
        assert_eq!(PinDirection::resolve("in"), PinDirection::NotSet);
        assert_eq!(PinDirection::default(), PinDirection::NotSet);
    }

    #[test]
    fn test_direction_code_roundtrip() {
        for direction in [PinDirection::NotSet, PinDirection::Input, PinDirection::Output] {
            assert_eq!(PinDirection::from_code(direction.code()), Some(direction));
        }
        assert_eq!(PinDirection::from_code(0x0030), None);
    }

    #[test]
    fn test_pin_resolution() {
        assert_eq!(PinId::resolve("a0"), PinId::A0);
        assert_eq!(PinId::resolve("d8"), PinId::D8);
        assert_eq!(PinId::resolve("D9"), PinId::Unknown);
        assert_eq!(PinId::A0.code(), 0x000A);
        assert_eq!(PinId::D3.code(), 3);
    }

    #[test]
    fn test_pin_names_and_indices() {
        for (index, pin) in PinId::DIGITAL.iter().enumerate() {
            assert_eq!(pin.digital_index(), Some(index));
            assert_eq!(PinId::resolve(pin.name()), *pin);
        }
        assert_eq!(PinId::A0.digital_index(), None);
        assert!(PinId::A0.is_analog());
        assert!(!PinId::D0.is_analog());
    }

    #[test]
    fn test_protocol_resolution() {
        assert_eq!(Protocol::resolve("HTTP"), Protocol::Http);
        assert_eq!(Protocol::resolve("serial"), Protocol::Serial);
        assert_eq!(Protocol::resolve("udp"), Protocol::Unknown);
        assert_eq!(Protocol::Tcp.name(), "tcp");
    }

    fn with_case(word: &str, mask: &[bool]) -> std::string::String {
        word.chars()
            .zip(mask.iter().cycle())
            .map(|(c, &upper)| if upper { c.to_ascii_uppercase() } else { c.to_ascii_lowercase() })
            .collect()
    }

    proptest! {
        #[test]
        fn test_resolution_is_total(token in "\\PC{0,16}") {
            // Every table returns a value for any input
            let _ = Command::resolve(&token);
            let _ = ConfigCommand::resolve(&token);
            let _ = PinDirection::resolve(&token);
            let _ = PinId::resolve(&token);
            let _ = Protocol::resolve(&token);
        }

        #[test]
        fn test_resolution_ignores_case(mask in prop::collection::vec(any::<bool>(), 1..12)) {
            for &(keyword, command) in Command::TABLE {
                prop_assert_eq!(Command::resolve(&with_case(keyword, &mask)), command);
            }
            for &(keyword, command) in ConfigCommand::TABLE {
                prop_assert_eq!(ConfigCommand::resolve(&with_case(keyword, &mask)), command);
            }
            for &(keyword, direction) in PinDirection::TABLE {
                prop_assert_eq!(PinDirection::resolve(&with_case(keyword, &mask)), direction);
            }
            for &(keyword, pin) in PinId::TABLE {
                prop_assert_eq!(PinId::resolve(&with_case(keyword, &mask)), pin);
            }
            for &(keyword, protocol) in Protocol::TABLE {
                prop_assert_eq!(Protocol::resolve(&with_case(keyword, &mask)), protocol);
            }
        }
    }
}
