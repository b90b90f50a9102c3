//! Runtime settings
//!
//! Settings for the host process itself, not the device configuration
//! (that lives in `config.txt` under the data directory). They come from an
//! optional TOML file; command line flags win over file values.

use std::fmt;
use std::fs;
use std::io;
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;

/// Default tick period
pub const DEFAULT_TICK_MS: u64 = 10;

/// Command line
#[derive(Debug, Default, Parser)]
#[command(name = "pinlink", version, about = "Remote pin control over console, TCP and HTTP")]
pub struct Args {
    /// TOML settings file
    #[arg(long, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Directory holding config.txt and the web files
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Address the TCP and HTTP listeners bind to
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<IpAddr>,

    /// Tick period in milliseconds
    #[arg(long, value_name = "MS")]
    pub tick_ms: Option<u64>,
}

/// Effective runtime settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeSettings {
    pub data_dir: PathBuf,
    pub bind: IpAddr,
    pub tick_ms: u64,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            tick_ms: DEFAULT_TICK_MS,
        }
    }
}

/// Settings file errors
#[derive(Debug)]
pub enum SettingsError {
    /// The file could not be read
    Read(PathBuf, io::Error),
    /// The file is not valid settings TOML
    Parse(toml::de::Error),
    /// The tick period is zero
    ZeroTick,
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Read(path, error) => {
                write!(f, "cannot read {}: {}", path.display(), error)
            }
            SettingsError::Parse(error) => write!(f, "invalid settings: {}", error),
            SettingsError::ZeroTick => f.write_str("tick_ms must be positive"),
        }
    }
}

impl std::error::Error for SettingsError {}

impl From<SettingsError> for io::Error {
    fn from(error: SettingsError) -> Self {
        io::Error::new(io::ErrorKind::InvalidInput, error)
    }
}

impl RuntimeSettings {
    /// Parse settings from TOML text; missing keys keep their defaults
    pub fn from_toml(text: &str) -> Result<Self, SettingsError> {
        toml::from_str(text).map_err(SettingsError::Parse)
    }

    /// Read and parse a settings file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text =
            fs::read_to_string(path).map_err(|error| SettingsError::Read(path.to_path_buf(), error))?;
        Self::from_toml(&text)
    }

    /// Combine the optional settings file with command line overrides
    pub fn resolve(args: &Args) -> Result<Self, SettingsError> {
        let base = match &args.settings {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        let settings = base.apply(args);
        if settings.tick_ms == 0 {
            return Err(SettingsError::ZeroTick);
        }
        Ok(settings)
    }

    fn apply(mut self, args: &Args) -> Self {
        if let Some(dir) = &args.data_dir {
            self.data_dir = dir.clone();
        }
        if let Some(bind) = args.bind {
            self.bind = bind;
        }
        if let Some(tick_ms) = args.tick_ms {
            self.tick_ms = tick_ms;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = RuntimeSettings::resolve(&Args::default()).unwrap();
        assert_eq!(settings, RuntimeSettings::default());
        assert_eq!(settings.tick_ms, DEFAULT_TICK_MS);
    }

    #[test]
    fn test_partial_file() {
        let settings = RuntimeSettings::from_toml("tick_ms = 50\n").unwrap();
        assert_eq!(settings.tick_ms, 50);
        assert_eq!(settings.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(matches!(
            RuntimeSettings::from_toml("tick = 5\n"),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn test_flags_override_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "data_dir = \"/srv/pins\"\nbind = \"127.0.0.1\"\ntick_ms = 25").unwrap();

        let path = file.path().to_str().unwrap();
        let args = Args::try_parse_from(["pinlink", "--settings", path, "--tick-ms", "5"]).unwrap();
        let settings = RuntimeSettings::resolve(&args).unwrap();
        assert_eq!(settings.data_dir, PathBuf::from("/srv/pins"));
        assert_eq!(settings.bind, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(settings.tick_ms, 5);
    }

    #[test]
    fn test_missing_file() {
        let args = Args {
            settings: Some(PathBuf::from("/nonexistent/pinlink.toml")),
            ..Args::default()
        };
        assert!(matches!(
            RuntimeSettings::resolve(&args),
            Err(SettingsError::Read(..))
        ));
    }

    #[test]
    fn test_zero_tick_rejected() {
        let args = Args::try_parse_from(["pinlink", "--tick-ms", "0"]).unwrap();
        assert!(matches!(
            RuntimeSettings::resolve(&args),
            Err(SettingsError::ZeroTick)
        ));
    }
}
