//! Wi-Fi link manager
//!
//! Called once per tick before any network transport runs. Association is
//! the only blocking step in the tick and is bounded by
//! [`CONNECT_ATTEMPTS`] polls spaced [`ATTEMPT_DELAY_MS`] apart.

use log::{info, warn};
use pinlink_hal::{SystemControl, WifiRadio};
use pinlink_protocol::ResultCode;

use crate::config::ConfigRecord;

/// Failed association cycles before the link gives up for good
pub const MAX_RETRY: u8 = 10;

/// Connectivity polls per association cycle
pub const CONNECT_ATTEMPTS: u8 = 10;

/// Delay between connectivity polls
pub const ATTEMPT_DELAY_MS: u32 = 500;

/// Link states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkState {
    /// Not associated, retries left
    Down,
    /// Associated with the access point
    Connected,
    /// Retry ceiling reached, the radio is no longer touched
    GaveUp,
}

/// Station connection policy with a retry ceiling
#[derive(Debug)]
pub struct WifiLink {
    retries: u8,
    state: LinkState,
}

impl Default for WifiLink {
    fn default() -> Self {
        Self::new()
    }
}

impl WifiLink {
    /// Create a link that has not tried to connect yet
    pub const fn new() -> Self {
        Self {
            retries: 0,
            state: LinkState::Down,
        }
    }

    /// Current link state
    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Failed association cycles so far
    pub fn retries(&self) -> u8 {
        self.retries
    }

    /// Check if the last call to [`WifiLink::connect`] ended associated
    pub fn is_connected(&self) -> bool {
        self.state == LinkState::Connected
    }

    /// Make sure the station is associated
    ///
    /// # Arguments
    /// * `radio` - Station interface
    /// * `system` - Used for the delay between polls
    /// * `record` - Credentials and static addressing
    ///
    /// # Returns
    /// - [`ResultCode::Success`] when associated
    /// - [`ResultCode::WifiConfig`] when the radio rejected the addressing;
    ///   the link gives up immediately
    /// - [`ResultCode::WifiConnection`] when association failed or the
    ///   retry ceiling was reached
    pub fn connect<R: WifiRadio, S: SystemControl>(
        &mut self,
        radio: &mut R,
        system: &mut S,
        record: &ConfigRecord,
    ) -> ResultCode {
        if self.retries >= MAX_RETRY {
            return ResultCode::WifiConnection;
        }
        if radio.is_connected() {
            self.retries = 0;
            self.set_state(LinkState::Connected);
            return ResultCode::Success;
        }

        if let Err(error) = radio.configure(&record.static_ip()) {
            warn!("static addressing rejected: {:?}", error);
            self.retries = MAX_RETRY;
            self.set_state(LinkState::GaveUp);
            return ResultCode::WifiConfig;
        }

        info!("connecting to '{}'", record.ssid.as_str());
        radio.begin(&record.ssid, &record.password);
        for _ in 0..CONNECT_ATTEMPTS {
            if radio.is_connected() {
                self.retries = 0;
                self.set_state(LinkState::Connected);
                return ResultCode::Success;
            }
            system.delay_ms(ATTEMPT_DELAY_MS);
        }

        self.retries += 1;
        warn!("association failed ({}/{})", self.retries, MAX_RETRY);
        self.set_state(if self.retries >= MAX_RETRY {
            LinkState::GaveUp
        } else {
            LinkState::Down
        });
        ResultCode::WifiConnection
    }

    fn set_state(&mut self, state: LinkState) {
        if self.state == state {
            return;
        }
        match state {
            LinkState::Connected => info!("wifi connected"),
            LinkState::Down => info!("wifi down"),
            LinkState::GaveUp => warn!("wifi disabled after {} failed attempts", self.retries),
        }
        self.state = state;
    }
}
