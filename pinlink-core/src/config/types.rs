//! Configuration type definitions
//!
//! These types represent the device configuration: station credentials,
//! static addressing, listener ports, session limits and the persisted
//! direction of every digital pin.

use core::fmt;
use core::net::Ipv4Addr;
use core::str::FromStr;

use heapless::String;
use pinlink_hal::StaticIp;
use pinlink_protocol::{PinDirection, PinId};

/// Path of the persisted configuration record
pub const CONFIG_PATH: &str = "/config.txt";

/// Maximum SSID length (802.11 limit)
pub const MAX_SSID_LEN: usize = 32;

/// Maximum WPA passphrase length
pub const MAX_PASSWORD_LEN: usize = 64;

/// Number of digital pins (D0..D8)
pub const DIGITAL_PIN_COUNT: usize = 9;

/// Default static address
pub const DEFAULT_IP: Ipv4Addr = Ipv4Addr::new(192, 168, 0, 222);
pub const DEFAULT_SUBNET: Ipv4Addr = Ipv4Addr::new(255, 255, 255, 0);
pub const DEFAULT_GATEWAY: Ipv4Addr = Ipv4Addr::new(192, 168, 0, 1);
pub const DEFAULT_DNS1: Ipv4Addr = Ipv4Addr::new(8, 8, 8, 8);
pub const DEFAULT_DNS2: Ipv4Addr = Ipv4Addr::new(8, 8, 4, 4);

/// Default socket session port
pub const DEFAULT_TCP_PORT: u16 = 333;

/// Default HTTP port
pub const DEFAULT_HTTP_PORT: u16 = 80;

/// Default session limit
pub const DEFAULT_MAX_CLIENTS: u16 = 12;

/// Default inactivity timeout (2 minutes)
pub const DEFAULT_TIMEOUT_MS: u32 = 120_000;

/// Complete device configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigRecord {
    /// Access point name
    pub ssid: String<MAX_SSID_LEN>,
    /// Access point passphrase
    pub password: String<MAX_PASSWORD_LEN>,
    /// Static station address
    pub ip: Ipv4Addr,
    pub subnet: Ipv4Addr,
    pub gateway: Ipv4Addr,
    pub dns1: Ipv4Addr,
    pub dns2: Ipv4Addr,
    /// Port for line-oriented socket sessions
    pub tcp_port: u16,
    /// Port for the HTTP control panel
    pub http_port: u16,
    /// Upper bound on concurrent socket sessions
    pub max_clients: u16,
    /// Idle time after which a socket session is evicted
    pub inactivity_timeout_ms: u32,
    /// Direction of D0..D8, in pin order
    pub pin_modes: [PinDirection; DIGITAL_PIN_COUNT],
}

impl Default for ConfigRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigRecord {
    /// Create a record with factory defaults
    pub fn new() -> Self {
        Self {
            ssid: String::new(),
            password: String::new(),
            ip: DEFAULT_IP,
            subnet: DEFAULT_SUBNET,
            gateway: DEFAULT_GATEWAY,
            dns1: DEFAULT_DNS1,
            dns2: DEFAULT_DNS2,
            tcp_port: DEFAULT_TCP_PORT,
            http_port: DEFAULT_HTTP_PORT,
            max_clients: DEFAULT_MAX_CLIENTS,
            inactivity_timeout_ms: DEFAULT_TIMEOUT_MS,
            pin_modes: [PinDirection::NotSet; DIGITAL_PIN_COUNT],
        }
    }

    /// Static addressing handed to the radio
    pub fn static_ip(&self) -> StaticIp {
        StaticIp {
            ip: self.ip,
            gateway: self.gateway,
            subnet: self.subnet,
            dns1: self.dns1,
            dns2: self.dns2,
        }
    }

    /// Stored direction of a pin
    ///
    /// The analog input is always an input; unknown pins are unset.
    pub fn pin_mode(&self, pin: PinId) -> PinDirection {
        if pin.is_analog() {
            return PinDirection::Input;
        }
        pin.digital_index()
            .map(|index| self.pin_modes[index])
            .unwrap_or_default()
    }
}

/// Human-readable listing, one field per line
///
/// The passphrase is never printed.
impl fmt::Display for ConfigRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ssid: {}", self.ssid)?;
        writeln!(
            f,
            "password: {}",
            if self.password.is_empty() { "(none)" } else { "********" }
        )?;
        writeln!(f, "ip: {}", self.ip)?;
        writeln!(f, "subnet: {}", self.subnet)?;
        writeln!(f, "gateway: {}", self.gateway)?;
        writeln!(f, "dns1: {}", self.dns1)?;
        writeln!(f, "dns2: {}", self.dns2)?;
        writeln!(f, "tcp-port: {}", self.tcp_port)?;
        writeln!(f, "http-port: {}", self.http_port)?;
        writeln!(f, "max-clients: {}", self.max_clients)?;
        write!(f, "timeout: {} ms", self.inactivity_timeout_ms)
    }
}

/// Parse a dotted-quad IPv4 address
pub fn parse_ipv4(text: &str) -> Option<Ipv4Addr> {
    text.parse().ok()
}

/// Parse a strictly positive unsigned integer
pub fn parse_positive<T>(text: &str) -> Option<T>
where
    T: FromStr + Default + PartialEq,
{
    text.parse::<T>().ok().filter(|value| *value != T::default())
}

/// Parse a credential field
///
/// Control characters would break the line-oriented record, and values
/// longer than the field capacity are rejected rather than truncated.
pub fn parse_text<const N: usize>(text: &str) -> Option<String<N>> {
    if text.chars().any(char::is_control) {
        return None;
    }
    String::try_from(text).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let record = ConfigRecord::new();
        assert!(record.ssid.is_empty());
        assert_eq!(record.ip, Ipv4Addr::new(192, 168, 0, 222));
        assert_eq!(record.tcp_port, 333);
        assert_eq!(record.http_port, 80);
        assert_eq!(record.max_clients, 12);
        assert_eq!(record.inactivity_timeout_ms, 120_000);
        assert!(record.pin_modes.iter().all(|m| *m == PinDirection::NotSet));
    }

    #[test]
    fn test_pin_mode_lookup() {
        let mut record = ConfigRecord::new();
        record.pin_modes[4] = PinDirection::Output;
        assert_eq!(record.pin_mode(PinId::D4), PinDirection::Output);
        assert_eq!(record.pin_mode(PinId::D5), PinDirection::NotSet);
        assert_eq!(record.pin_mode(PinId::A0), PinDirection::Input);
        assert_eq!(record.pin_mode(PinId::Unknown), PinDirection::NotSet);
    }

    #[test]
    fn test_parse_ipv4() {
        assert_eq!(parse_ipv4("10.0.0.7"), Some(Ipv4Addr::new(10, 0, 0, 7)));
        assert_eq!(parse_ipv4("999.999.999.999"), None);
        assert_eq!(parse_ipv4("10.0.0"), None);
        assert_eq!(parse_ipv4("10.0.0.1.5"), None);
        assert_eq!(parse_ipv4("router"), None);
    }

    #[test]
    fn test_parse_positive() {
        assert_eq!(parse_positive::<u16>("8080"), Some(8080));
        assert_eq!(parse_positive::<u16>("0"), None);
        assert_eq!(parse_positive::<u16>("-1"), None);
        assert_eq!(parse_positive::<u16>("70000"), None);
        assert_eq!(parse_positive::<u32>("12abc"), None);
        assert_eq!(parse_positive::<u32>("600000"), Some(600_000));
    }

    #[test]
    fn test_parse_text() {
        assert_eq!(parse_text::<8>("home").unwrap().as_str(), "home");
        assert!(parse_text::<8>("line\nbreak").is_none());
        assert!(parse_text::<4>("too long").is_none());
    }

    #[test]
    fn test_display_masks_password() {
        let mut record = ConfigRecord::new();
        record.password = String::try_from("hunter22").unwrap();
        let text = std::format!("{}", record);
        assert!(text.contains("password: ********"));
        assert!(!text.contains("hunter22"));
        assert!(text.contains("ip: 192.168.0.222"));
    }
}
