//! Device orchestrator
//!
//! The device owns every piece of state plus the platform capabilities and
//! advances them one cooperative tick at a time:
//!
//! 1. First tick only: load the configuration and restore pin directions
//! 2. Console line, if one is complete
//! 3. Wi-Fi link check
//! 4. Socket sessions, then the HTTP server (only while the link is up)
//! 5. Persist the configuration if it changed

use log::{debug, info, trace, warn};
use pinlink_hal::{Board, Listener, Platform, SystemControl};
use pinlink_protocol::{tokenize, LineBuffer, ResultCode};

use crate::config::ConfigStore;
use crate::dispatch::{CommandSink, Dispatcher};
use crate::http::HttpServer;
use crate::input::{poll_line, LinePoll};
use crate::link::{LinkState, WifiLink};
use crate::pins::PinRegistry;
use crate::session::{SessionLimits, SessionManager};

type StreamOf<P> = <<P as Platform>::Listener as Listener>::Stream;

/// The pin control device
pub struct Device<P: Platform> {
    /// Persisted configuration
    store: ConfigStore,
    /// Logical pins and the GPIO driver
    pins: PinRegistry<P::Pins>,
    /// Socket sessions
    sessions: SessionManager<StreamOf<P>>,
    /// HTTP control panel
    http: HttpServer<StreamOf<P>>,
    /// Wi-Fi retry policy
    link: WifiLink,
    /// Partial console input
    console_line: LineBuffer,
    storage: P::Storage,
    radio: P::Radio,
    tcp: P::Listener,
    web: P::Listener,
    console: P::Console,
    system: P::System,
    /// Configuration loaded and pins restored
    booted: bool,
}

impl<P: Platform> Device<P> {
    /// Create a device from a board's capabilities
    ///
    /// Nothing touches the hardware until the first [`Device::tick`].
    pub fn new(board: Board<P>) -> Self {
        Self {
            store: ConfigStore::new(),
            pins: PinRegistry::new(board.pins),
            sessions: SessionManager::new(),
            http: HttpServer::new(),
            link: WifiLink::new(),
            console_line: LineBuffer::new(),
            storage: board.storage,
            radio: board.radio,
            tcp: board.tcp,
            web: board.http,
            console: board.console,
            system: board.system,
            booted: false,
        }
    }

    /// Configuration store
    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// Pin registry
    pub fn pins(&self) -> &PinRegistry<P::Pins> {
        &self.pins
    }

    /// Socket session pool
    pub fn sessions(&self) -> &SessionManager<StreamOf<P>> {
        &self.sessions
    }

    /// Wi-Fi link
    pub fn link(&self) -> &WifiLink {
        &self.link
    }

    /// Platform system services
    pub fn system(&self) -> &P::System {
        &self.system
    }

    /// Mutable access to the platform system services
    pub fn system_mut(&mut self) -> &mut P::System {
        &mut self.system
    }

    /// Platform file storage
    pub fn storage(&self) -> &P::Storage {
        &self.storage
    }

    /// Run one cooperative tick
    ///
    /// # Returns
    /// The last non-success code observed during the tick, or success.
    pub fn tick(&mut self) -> ResultCode {
        let mut last = ResultCode::Success;

        if !self.booted {
            observe(&mut last, "boot", self.boot());
        }

        observe(&mut last, "console", self.poll_console());

        let link = self
            .link
            .connect(&mut self.radio, &mut self.system, self.store.record());
        if !link.is_success() {
            // Giving up is logged once by the link itself
            if self.link.state() != LinkState::GaveUp {
                debug!("link: {}", link);
            }
            last = link;
        } else {
            let now_ms = self.system.now_ms();
            let limits = SessionLimits::from_record(self.store.record());
            let http_port = self.store.record().http_port;

            let mut dispatcher = Dispatcher::new(&mut self.store, &mut self.pins, &mut self.system);
            observe(
                &mut last,
                "sessions",
                self.sessions.tick(&mut self.tcp, now_ms, limits, &mut dispatcher),
            );
            observe(
                &mut last,
                "http",
                self.http
                    .tick(&mut self.web, http_port, now_ms, &mut dispatcher, &mut self.storage),
            );
        }

        if let Err(code) = self.store.save(&mut self.storage) {
            observe(&mut last, "save", code);
        }

        last
    }

    /// Close every connection and hand the capabilities back
    pub fn into_board(mut self) -> Board<P> {
        self.sessions.close_all();
        self.http.close();
        Board {
            pins: self.pins.into_driver(),
            storage: self.storage,
            radio: self.radio,
            tcp: self.tcp,
            http: self.web,
            console: self.console,
            system: self.system,
        }
    }

    fn boot(&mut self) -> ResultCode {
        self.booted = true;
        let result = match self.store.load(&mut self.storage) {
            Ok(()) => ResultCode::Success,
            Err(code) => code,
        };
        let restored = self.pins.restore(&self.store.record().pin_modes);
        info!("boot complete, {} pins restored", restored);
        result
    }

    fn poll_console(&mut self) -> ResultCode {
        match poll_line(&mut self.console, &mut self.console_line) {
            LinePoll::Line(line) => {
                let tokens = tokenize(&line);
                if tokens.is_empty() {
                    return ResultCode::Success;
                }
                Dispatcher::new(&mut self.store, &mut self.pins, &mut self.system).execute(&tokens)
            }
            LinePoll::Dropped(error) => {
                warn!("console input dropped ({:?})", error);
                ResultCode::Success
            }
            LinePoll::Pending => ResultCode::Success,
            LinePoll::Closed => {
                trace!("console closed");
                ResultCode::Success
            }
        }
    }
}

fn observe(last: &mut ResultCode, source: &str, code: ResultCode) {
    if !code.is_success() {
        warn!("{}: {}", source, code);
        *last = code;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{decode_record, encode_record, ConfigRecord, CONFIG_PATH};
    use crate::mock::{board, MockPlatform, MockRadio};
    use crate::session::SessionState;
    use pinlink_protocol::{PinDirection, PinId};

    fn persisted(record: &ConfigRecord) -> std::string::String {
        let mut text = std::string::String::new();
        encode_record(record, &mut text).unwrap();
        text
    }

    #[test]
    fn test_boot_restores_persisted_pins() {
        let (board, handles) = board();
        let mut record = ConfigRecord::new();
        record.pin_modes[1] = PinDirection::Output;
        record.pin_modes[7] = PinDirection::Input;
        let text = persisted(&record);
        handles.storage.put(CONFIG_PATH, text.as_bytes());

        let mut device: Device<MockPlatform> = Device::new(board);
        assert_eq!(device.tick(), ResultCode::Success);
        assert!(device.store().is_loaded());
        assert!(!device.store().is_dirty());
        assert_eq!(device.pins().mode(PinId::D1), Some(PinDirection::Output));
        assert_eq!(device.pins().mode(PinId::D7), Some(PinDirection::Input));
        assert_eq!(handles.storage.get(CONFIG_PATH).as_deref(), Some(text.as_str()));
    }

    #[test]
    fn test_corrupt_config_reported_once() {
        let (board, handles) = board();
        handles.storage.put(CONFIG_PATH, b"garbage");
        let mut device: Device<MockPlatform> = Device::new(board);

        assert_eq!(device.tick(), ResultCode::ConfigCorrupt);
        assert_eq!(device.store().record(), &ConfigRecord::new());
        assert_eq!(device.tick(), ResultCode::Success);
    }

    #[test]
    fn test_console_change_is_persisted() {
        let (board, handles) = board();
        let mut device: Device<MockPlatform> = Device::new(board);
        handles.console.type_line("config pin D5 output");

        assert_eq!(device.tick(), ResultCode::Success);
        assert!(!device.store().is_dirty());
        let saved = handles.storage.get(CONFIG_PATH).unwrap();
        let record = decode_record(&saved).unwrap();
        assert_eq!(record.pin_mode(PinId::D5), PinDirection::Output);
    }

    #[test]
    fn test_console_error_is_returned() {
        let (board, handles) = board();
        let mut device: Device<MockPlatform> = Device::new(board);
        handles.console.type_line("read D12");
        assert_eq!(device.tick(), ResultCode::PinUnknown);
    }

    #[test]
    fn test_failed_save_stays_dirty() {
        let (board, handles) = board();
        let mut device: Device<MockPlatform> = Device::new(board);
        handles.storage.fail_writes(true);
        handles.console.type_line("config tcp-port 4000");

        assert_eq!(device.tick(), ResultCode::ConfigStorage);
        assert!(device.store().is_dirty());

        handles.storage.fail_writes(false);
        assert_eq!(device.tick(), ResultCode::Success);
        assert!(!device.store().is_dirty());
    }

    #[test]
    fn test_socket_session_drives_pins() {
        let (board, handles) = board();
        let mut device: Device<MockPlatform> = Device::new(board);
        device.tick();
        assert_eq!(handles.tcp.port(), Some(333));
        assert_eq!(handles.http.port(), Some(80));

        let client = handles.tcp.connect();
        device.tick();
        assert_eq!(device.sessions().len(), 1);

        client.send(b"config pin D1 output\r\nwrite D1 1\r\n");
        device.tick();
        device.tick();
        assert_eq!(device.pins().driver().levels.get(&5), Some(&true));
        assert!(device
            .sessions()
            .sessions()
            .all(|session| session.state() == SessionState::Active));
    }

    #[test]
    fn test_idle_session_evicted() {
        let (board, handles) = board();
        let mut device: Device<MockPlatform> = Device::new(board);
        device.tick();
        let client = handles.tcp.connect();
        device.tick();

        handles.clock.advance(u64::from(ConfigRecord::new().inactivity_timeout_ms));
        assert_eq!(device.tick(), ResultCode::ClientDisconnected);
        assert!(device.sessions().is_empty());
        assert!(client.is_closed());
    }

    #[test]
    fn test_http_read() {
        let (board, handles) = board();
        let mut device: Device<MockPlatform> = Device::new(board);
        device.tick();

        let client = handles.http.connect();
        client.send(b"GET /read?pin=A0 HTTP/1.1\r\n\r\n");
        device.tick();
        assert!(client.written().starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(client.written().ends_with("\r\n\r\n0"));
    }

    #[test]
    fn test_reset_command() {
        let (board, handles) = board();
        let mut device: Device<MockPlatform> = Device::new(board);
        handles.console.type_line("reset");
        device.tick();
        assert_eq!(device.system().resets, 1);
    }

    #[test]
    fn test_no_network_without_link() {
        let (mut board, handles) = board();
        board.radio = MockRadio::default();
        let mut device: Device<MockPlatform> = Device::new(board);

        assert_eq!(device.tick(), ResultCode::WifiConnection);
        assert_eq!(handles.tcp.port(), None);
        assert_eq!(handles.http.port(), None);

        // The console keeps working
        handles.console.type_line("config pin D2 input");
        device.tick();
        assert_eq!(device.pins().mode(PinId::D2), Some(PinDirection::Input));
    }

    #[test]
    fn test_into_board_closes_sessions() {
        let (board, handles) = board();
        let mut device: Device<MockPlatform> = Device::new(board);
        device.tick();
        let client = handles.tcp.connect();
        device.tick();

        let board = device.into_board();
        assert!(client.is_closed());
        let mut device: Device<MockPlatform> = Device::new(board);
        device.tick();
        assert!(device.sessions().is_empty());
    }
}
