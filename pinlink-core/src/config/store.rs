//! Configuration persistence
//!
//! The record is stored as a flat text file, one field per line, in a fixed
//! order:
//!
//! ```text
//! 9 lines   D0..D8 direction code (0 unset, 16 input, 32 output)
//! ssid
//! password
//! ip
//! subnet
//! gateway
//! tcp port
//! http port
//! dns1
//! dns2
//! max clients
//! inactivity timeout (ms)
//! ```

use core::fmt::{self, Write};

use heapless::String;
use log::{debug, info, warn};
use pinlink_hal::{FileStorage, StorageError};
use pinlink_protocol::{PinDirection, ResultCode};

use super::types::{parse_ipv4, parse_positive, parse_text, ConfigRecord, CONFIG_PATH};

/// Upper bound on the encoded record size
pub const MAX_RECORD_SIZE: usize = 512;

/// Write `record` in the persisted text format
pub fn encode_record<W: Write>(record: &ConfigRecord, out: &mut W) -> fmt::Result {
    for mode in &record.pin_modes {
        writeln!(out, "{}", mode.code())?;
    }
    writeln!(out, "{}", record.ssid)?;
    writeln!(out, "{}", record.password)?;
    writeln!(out, "{}", record.ip)?;
    writeln!(out, "{}", record.subnet)?;
    writeln!(out, "{}", record.gateway)?;
    writeln!(out, "{}", record.tcp_port)?;
    writeln!(out, "{}", record.http_port)?;
    writeln!(out, "{}", record.dns1)?;
    writeln!(out, "{}", record.dns2)?;
    writeln!(out, "{}", record.max_clients)?;
    writeln!(out, "{}", record.inactivity_timeout_ms)
}

/// Parse a record from the persisted text format
///
/// Every field must be present and valid. Text fields are taken verbatim;
/// numeric and address fields tolerate surrounding whitespace.
pub fn decode_record(text: &str) -> Option<ConfigRecord> {
    let mut lines = text.lines();
    let mut record = ConfigRecord::new();

    for mode in record.pin_modes.iter_mut() {
        let code = lines.next()?.trim().parse::<u16>().ok()?;
        *mode = PinDirection::from_code(code)?;
    }
    record.ssid = parse_text(lines.next()?)?;
    record.password = parse_text(lines.next()?)?;
    record.ip = parse_ipv4(lines.next()?.trim())?;
    record.subnet = parse_ipv4(lines.next()?.trim())?;
    record.gateway = parse_ipv4(lines.next()?.trim())?;
    record.tcp_port = parse_positive(lines.next()?.trim())?;
    record.http_port = parse_positive(lines.next()?.trim())?;
    record.dns1 = parse_ipv4(lines.next()?.trim())?;
    record.dns2 = parse_ipv4(lines.next()?.trim())?;
    record.max_clients = parse_positive(lines.next()?.trim())?;
    record.inactivity_timeout_ms = parse_positive(lines.next()?.trim())?;

    Some(record)
}

/// Owner of the in-memory configuration record
///
/// Every accepted mutation goes through [`ConfigStore::update`], which marks
/// the record dirty. [`ConfigStore::save`] only touches storage when dirty.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    record: ConfigRecord,
    loaded: bool,
    dirty: bool,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore {
    /// Create a store holding defaults, not yet loaded
    pub fn new() -> Self {
        Self {
            record: ConfigRecord::new(),
            loaded: false,
            dirty: false,
        }
    }

    /// Current record
    pub fn record(&self) -> &ConfigRecord {
        &self.record
    }

    /// Whether [`ConfigStore::load`] has run
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Whether the record has unsaved changes
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mutate the record and mark it dirty
    pub fn update<R>(&mut self, f: impl FnOnce(&mut ConfigRecord) -> R) -> R {
        self.dirty = true;
        f(&mut self.record)
    }

    /// Load the persisted record
    ///
    /// A missing record yields defaults. A record that cannot be read or
    /// parsed also yields defaults, but is reported as
    /// [`ResultCode::ConfigCorrupt`]. Either way the store ends up loaded and
    /// clean.
    pub fn load<S: FileStorage>(&mut self, storage: &mut S) -> Result<(), ResultCode> {
        self.loaded = true;
        self.dirty = false;

        if !storage.exists(CONFIG_PATH) {
            info!("no stored configuration, using defaults");
            self.record = ConfigRecord::new();
            return Ok(());
        }

        let mut buffer = [0u8; MAX_RECORD_SIZE];
        let parsed = storage
            .read(CONFIG_PATH, &mut buffer)
            .ok()
            .and_then(|n| core::str::from_utf8(&buffer[..n]).ok())
            .and_then(decode_record);

        match parsed {
            Some(record) => {
                self.record = record;
                info!("configuration loaded from {}", CONFIG_PATH);
                Ok(())
            }
            None => {
                warn!("stored configuration is corrupt, using defaults");
                self.record = ConfigRecord::new();
                Err(ResultCode::ConfigCorrupt)
            }
        }
    }

    /// Persist the record if it changed
    ///
    /// # Returns
    /// `Ok(true)` when the record was written, `Ok(false)` when there was
    /// nothing to save. On failure the record stays dirty.
    pub fn save<S: FileStorage>(&mut self, storage: &mut S) -> Result<bool, ResultCode> {
        if !self.dirty {
            return Ok(false);
        }

        let mut text: String<MAX_RECORD_SIZE> = String::new();
        encode_record(&self.record, &mut text).map_err(|_| ResultCode::ConfigStorage)?;
        storage
            .write(CONFIG_PATH, text.as_bytes())
            .map_err(|error: StorageError| {
                warn!("saving configuration failed: {:?}", error);
                ResultCode::ConfigStorage
            })?;

        self.dirty = false;
        debug!("configuration saved ({} bytes)", text.len());
        Ok(true)
    }

    /// Raw persisted record text
    ///
    /// # Returns
    /// `Ok(None)` when nothing has been persisted yet.
    pub fn read_persisted<'b, S: FileStorage>(
        storage: &mut S,
        buffer: &'b mut [u8],
    ) -> Result<Option<&'b str>, ResultCode> {
        if !storage.exists(CONFIG_PATH) {
            return Ok(None);
        }
        let n = storage
            .read(CONFIG_PATH, buffer)
            .map_err(|_| ResultCode::ConfigCorrupt)?;
        core::str::from_utf8(&buffer[..n])
            .map(Some)
            .map_err(|_| ResultCode::ConfigCorrupt)
    }
}
