//! Session pool

use heapless::Vec;
use log::{debug, info, warn};
use pinlink_hal::{Listener, Stream};
use pinlink_protocol::{tokenize, LineBuffer, ResultCode};

use super::state::{SessionEvent, SessionState};
use crate::config::ConfigRecord;
use crate::dispatch::CommandSink;
use crate::input::{poll_line, LinePoll};

/// Hard upper bound on concurrent sessions
pub const MAX_SESSIONS: usize = 16;

/// Pool parameters taken from the configuration record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SessionLimits {
    /// Port to listen on
    pub port: u16,
    /// Configured session limit (further capped by pool capacity)
    pub max_clients: u16,
    /// Idle time after which a session is evicted
    pub inactivity_timeout_ms: u32,
}

impl SessionLimits {
    /// Limits from the current configuration
    pub fn from_record(record: &ConfigRecord) -> Self {
        Self {
            port: record.tcp_port,
            max_clients: record.max_clients,
            inactivity_timeout_ms: record.inactivity_timeout_ms,
        }
    }
}

/// One connected client
pub struct Session<S> {
    id: u32,
    stream: S,
    established_ms: u64,
    last_active_ms: u64,
    state: SessionState,
    line: LineBuffer,
}

impl<S: Stream> Session<S> {
    fn new(id: u32, stream: S, now_ms: u64) -> Self {
        Self {
            id,
            stream,
            established_ms: now_ms,
            last_active_ms: now_ms,
            state: SessionState::Established,
            line: LineBuffer::new(),
        }
    }

    /// Pool-unique session number
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Lifecycle state after the last tick
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Time the connection was accepted
    pub fn established_ms(&self) -> u64 {
        self.established_ms
    }

    /// Time the last command line was received
    pub fn last_active_ms(&self) -> u64 {
        self.last_active_ms
    }

    /// Check if the session is still within its inactivity window
    pub fn is_active(&self, now_ms: u64, timeout_ms: u32) -> bool {
        now_ms.saturating_sub(self.last_active_ms) < u64::from(timeout_ms)
    }

    fn apply(&mut self, event: SessionEvent) {
        self.state = self.state.transition(event);
    }
}

/// Pool of socket sessions
///
/// Sessions are kept in acceptance order. The pool never holds more than
/// `min(max_clients, N)` sessions; further connections wait in the
/// listener's backlog until a slot frees up.
pub struct SessionManager<S, const N: usize = MAX_SESSIONS> {
    sessions: Vec<Session<S>, N>,
    listening_on: Option<u16>,
    next_id: u32,
}

impl<S: Stream, const N: usize> Default for SessionManager<S, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Stream, const N: usize> SessionManager<S, N> {
    /// Create an empty pool
    pub fn new() -> Self {
        Self {
            sessions: Vec::new(),
            listening_on: None,
            next_id: 0,
        }
    }

    /// Number of managed sessions
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Check if no session is managed
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Fixed pool capacity
    pub fn capacity(&self) -> usize {
        N
    }

    /// Managed sessions in acceptance order
    pub fn sessions(&self) -> impl Iterator<Item = &Session<S>> {
        self.sessions.iter()
    }

    /// Close every session
    pub fn close_all(&mut self) {
        for session in self.sessions.iter_mut() {
            session.stream.close();
        }
        self.sessions.clear();
    }

    /// Service the pool once
    ///
    /// Starts listening on first use, accepts at most one connection, then
    /// gives every session one chance to deliver a command line to `sink`.
    /// Sessions that are closed by the peer, or have nothing to say and
    /// have outlived the inactivity timeout, are evicted.
    ///
    /// # Returns
    /// The last non-success code produced by `sink` during this tick,
    /// [`ResultCode::Tcp`] if listening failed,
    /// [`ResultCode::ClientDisconnected`] if a session was evicted and no
    /// command failed, otherwise success.
    pub fn tick<L, K>(
        &mut self,
        listener: &mut L,
        now_ms: u64,
        limits: SessionLimits,
        sink: &mut K,
    ) -> ResultCode
    where
        L: Listener<Stream = S>,
        K: CommandSink + ?Sized,
    {
        if self.listening_on != Some(limits.port) {
            if let Err(error) = listener.listen(limits.port) {
                warn!("cannot listen on tcp port {}: {:?}", limits.port, error);
                return ResultCode::Tcp;
            }
            info!("listening for sessions on port {}", limits.port);
            self.listening_on = Some(limits.port);
        }

        self.accept(listener, now_ms, limits);

        let mut result = ResultCode::Success;
        let mut i = 0;
        while i < self.sessions.len() {
            let session = &mut self.sessions[i];
            let event = match poll_line(&mut session.stream, &mut session.line) {
                LinePoll::Line(line) => {
                    let tokens = tokenize(&line);
                    if tokens.is_empty() {
                        SessionEvent::NoData
                    } else {
                        session.last_active_ms = now_ms;
                        let code = sink.execute(&tokens);
                        if !code.is_success() {
                            warn!("session {}: {}", session.id, code);
                            result = code;
                        }
                        SessionEvent::LineReceived
                    }
                }
                LinePoll::Pending => SessionEvent::NoData,
                LinePoll::Dropped(error) => {
                    warn!("session {}: input dropped ({:?})", session.id, error);
                    SessionEvent::NoData
                }
                LinePoll::Closed => SessionEvent::Disconnected,
            };

            let event = match event {
                SessionEvent::NoData
                    if !session.is_active(now_ms, limits.inactivity_timeout_ms) =>
                {
                    SessionEvent::TimedOut
                }
                other => other,
            };
            session.apply(event);

            if session.state.is_terminal() {
                let mut evicted = self.sessions.remove(i);
                evicted.stream.close();
                if result.is_success() {
                    result = ResultCode::ClientDisconnected;
                }
                info!(
                    "session {} evicted ({:?}), {} remaining",
                    evicted.id,
                    event,
                    self.sessions.len()
                );
            } else {
                i += 1;
            }
        }

        result
    }

    fn accept<L: Listener<Stream = S>>(&mut self, listener: &mut L, now_ms: u64, limits: SessionLimits) {
        let limit = usize::from(limits.max_clients).min(N);
        if self.sessions.len() >= limit {
            return;
        }
        let Some(stream) = listener.accept() else {
            return;
        };

        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        match self.sessions.push(Session::new(id, stream, now_ms)) {
            Ok(()) => info!("session {} accepted ({} active)", id, self.sessions.len()),
            Err(mut rejected) => {
                rejected.stream.close();
                debug!("session {} rejected, pool full", id);
            }
        }
    }
}
