//! In-memory platform for unit tests
//!
//! Handles are `Rc`-shared so a test can keep poking at a stream, listener
//! or clock after ownership moved into the code under test.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;
use std::string::{String, ToString};
use std::vec::Vec;

use pinlink_hal::{
    Board, Direction, FileStorage, Listener, NetError, PinDriver, Platform, StaticIp,
    StorageError, Stream, SystemControl, WifiRadio,
};

#[derive(Debug, Default)]
pub struct MockPins {
    pub directions: BTreeMap<u8, Direction>,
    pub levels: BTreeMap<u8, bool>,
    pub analog: u16,
    pub reads: u32,
}

impl PinDriver for MockPins {
    fn set_direction(&mut self, gpio: u8, direction: Direction) {
        self.directions.insert(gpio, direction);
    }

    fn read_digital(&mut self, gpio: u8) -> bool {
        self.reads += 1;
        self.levels.get(&gpio).copied().unwrap_or(false)
    }

    fn read_analog(&mut self, _gpio: u8) -> u16 {
        self.reads += 1;
        self.analog
    }

    fn write_digital(&mut self, gpio: u8, high: bool) {
        self.levels.insert(gpio, high);
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemStorage {
    files: Rc<RefCell<BTreeMap<String, Vec<u8>>>>,
    fail_writes: Rc<Cell<bool>>,
}

impl MemStorage {
    pub fn put(&self, path: &str, data: &[u8]) {
        self.files.borrow_mut().insert(path.to_string(), data.to_vec());
    }

    pub fn get(&self, path: &str) -> Option<String> {
        self.files
            .borrow()
            .get(path)
            .map(|data| String::from_utf8_lossy(data).into_owned())
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }
}

impl FileStorage for MemStorage {
    fn exists(&mut self, path: &str) -> bool {
        self.files.borrow().contains_key(path)
    }

    fn size(&mut self, path: &str) -> Result<usize, StorageError> {
        self.files
            .borrow()
            .get(path)
            .map(Vec::len)
            .ok_or(StorageError::NotFound)
    }

    fn read_at(
        &mut self,
        path: &str,
        offset: usize,
        buffer: &mut [u8],
    ) -> Result<usize, StorageError> {
        let files = self.files.borrow();
        let data = files.get(path).ok_or(StorageError::NotFound)?;
        let start = offset.min(data.len());
        let n = (data.len() - start).min(buffer.len());
        buffer[..n].copy_from_slice(&data[start..start + n]);
        Ok(n)
    }

    fn write(&mut self, path: &str, data: &[u8]) -> Result<(), StorageError> {
        if self.fail_writes.get() {
            return Err(StorageError::Full);
        }
        self.put(path, data);
        Ok(())
    }

    fn remove(&mut self, path: &str) -> Result<(), StorageError> {
        self.files
            .borrow_mut()
            .remove(path)
            .map(|_| ())
            .ok_or(StorageError::NotFound)
    }
}

#[derive(Debug, Default)]
struct StreamState {
    incoming: VecDeque<u8>,
    written: Vec<u8>,
    peer_closed: bool,
    closed: bool,
}

#[derive(Debug, Clone, Default)]
pub struct MockStream(Rc<RefCell<StreamState>>);

impl MockStream {
    pub fn send(&self, bytes: &[u8]) {
        self.0.borrow_mut().incoming.extend(bytes.iter().copied());
    }

    pub fn hang_up(&self) {
        self.0.borrow_mut().peer_closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.0.borrow().closed
    }

    pub fn written(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow().written).into_owned()
    }
}

impl embedded_io::ErrorType for MockStream {
    type Error = NetError;
}

impl embedded_io::Read for MockStream {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, NetError> {
        let mut state = self.0.borrow_mut();
        let n = buf.len().min(state.incoming.len());
        for slot in buf.iter_mut().take(n) {
            *slot = state.incoming.pop_front().unwrap_or(0);
        }
        Ok(n)
    }
}

impl embedded_io::ReadReady for MockStream {
    fn read_ready(&mut self) -> Result<bool, NetError> {
        let state = self.0.borrow();
        Ok(!state.incoming.is_empty() || state.peer_closed)
    }
}

impl embedded_io::Write for MockStream {
    fn write(&mut self, buf: &[u8]) -> Result<usize, NetError> {
        let mut state = self.0.borrow_mut();
        if state.closed {
            return Err(NetError::Closed);
        }
        state.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), NetError> {
        Ok(())
    }
}

impl Stream for MockStream {
    fn close(&mut self) {
        self.0.borrow_mut().closed = true;
    }
}

#[derive(Debug, Default)]
struct ListenerState {
    pending: VecDeque<MockStream>,
    port: Option<u16>,
    fail_listen: bool,
    listen_calls: u32,
}

#[derive(Debug, Clone, Default)]
pub struct MockListener(Rc<RefCell<ListenerState>>);

impl MockListener {
    /// Queue an incoming connection and return the client's view of it
    pub fn connect(&self) -> MockStream {
        let stream = MockStream::default();
        self.0.borrow_mut().pending.push_back(stream.clone());
        stream
    }

    pub fn port(&self) -> Option<u16> {
        self.0.borrow().port
    }

    pub fn pending(&self) -> usize {
        self.0.borrow().pending.len()
    }

    pub fn listen_calls(&self) -> u32 {
        self.0.borrow().listen_calls
    }

    pub fn fail_listen(&self, fail: bool) {
        self.0.borrow_mut().fail_listen = fail;
    }
}

impl Listener for MockListener {
    type Stream = MockStream;

    fn listen(&mut self, port: u16) -> Result<(), NetError> {
        let mut state = self.0.borrow_mut();
        state.listen_calls += 1;
        if state.fail_listen {
            return Err(NetError::Bind);
        }
        state.port = Some(port);
        Ok(())
    }

    fn accept(&mut self) -> Option<MockStream> {
        let mut state = self.0.borrow_mut();
        if state.port.is_none() {
            return None;
        }
        state.pending.pop_front()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockClock(Rc<Cell<u64>>);

impl MockClock {
    pub fn now(&self) -> u64 {
        self.0.get()
    }

    pub fn advance(&self, ms: u64) {
        self.0.set(self.0.get() + ms);
    }
}

#[derive(Debug, Default)]
pub struct MockSystem {
    pub clock: MockClock,
    pub resets: u32,
    pub delays: Vec<u32>,
}

impl SystemControl for MockSystem {
    fn now_ms(&self) -> u64 {
        self.clock.now()
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delays.push(ms);
        self.clock.advance(u64::from(ms));
    }

    fn reset(&mut self) {
        self.resets += 1;
    }
}

#[derive(Debug, Default)]
pub struct MockRadio {
    pub connected: bool,
    /// Associate as soon as `begin` is called
    pub accept_credentials: bool,
    pub fail_configure: bool,
    pub associating: bool,
    pub configured: Option<StaticIp>,
    pub begins: u32,
    pub polls: u32,
}

impl MockRadio {
    pub fn accepting() -> Self {
        Self {
            accept_credentials: true,
            ..Self::default()
        }
    }
}

impl WifiRadio for MockRadio {
    fn is_connected(&mut self) -> bool {
        self.polls += 1;
        if self.associating {
            self.connected = true;
        }
        self.connected
    }

    fn configure(&mut self, addressing: &StaticIp) -> Result<(), NetError> {
        if self.fail_configure {
            return Err(NetError::Config);
        }
        self.configured = Some(*addressing);
        Ok(())
    }

    fn begin(&mut self, _ssid: &str, _password: &str) {
        self.begins += 1;
        self.associating = self.accept_credentials;
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockConsole(Rc<RefCell<VecDeque<u8>>>);

impl MockConsole {
    pub fn type_line(&self, line: &str) {
        let mut input = self.0.borrow_mut();
        input.extend(line.bytes());
        input.push_back(b'\n');
    }
}

impl embedded_io::ErrorType for MockConsole {
    type Error = NetError;
}

impl embedded_io::Read for MockConsole {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, NetError> {
        let mut input = self.0.borrow_mut();
        let n = buf.len().min(input.len());
        for slot in buf.iter_mut().take(n) {
            *slot = input.pop_front().unwrap_or(0);
        }
        Ok(n)
    }
}

impl embedded_io::ReadReady for MockConsole {
    fn read_ready(&mut self) -> Result<bool, NetError> {
        Ok(!self.0.borrow().is_empty())
    }
}

pub struct MockPlatform;

impl Platform for MockPlatform {
    type Pins = MockPins;
    type Storage = MemStorage;
    type Radio = MockRadio;
    type Listener = MockListener;
    type Console = MockConsole;
    type System = MockSystem;
}

/// Test-side handles into a mock board
pub struct Handles {
    pub storage: MemStorage,
    pub tcp: MockListener,
    pub http: MockListener,
    pub console: MockConsole,
    pub clock: MockClock,
}

/// A mock board whose radio associates on the first attempt
pub fn board() -> (Board<MockPlatform>, Handles) {
    let handles = Handles {
        storage: MemStorage::default(),
        tcp: MockListener::default(),
        http: MockListener::default(),
        console: MockConsole::default(),
        clock: MockClock::default(),
    };
    let board = Board {
        pins: MockPins::default(),
        storage: handles.storage.clone(),
        radio: MockRadio::accepting(),
        tcp: handles.tcp.clone(),
        http: handles.http.clone(),
        console: handles.console.clone(),
        system: MockSystem {
            clock: handles.clock.clone(),
            ..MockSystem::default()
        },
    };
    (board, handles)
}
