//! Session lifecycle
//!
//! ```text
//! Established ──line──▶ Active ◀──line──┐
//!      │                   │             │
//!      │                no data          │
//!      │                   ▼             │
//!      │                 Idle ───────────┘
//!      │                   │
//!      └──timeout/close────┴──timeout/close──▶ Evicted
//! ```

/// Session states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionState {
    /// Accepted, no command received yet
    Established,
    /// A command line was received this tick
    Active,
    /// No command line this tick
    Idle,
    /// Closed and removed from the pool
    Evicted,
}

/// Observations made while servicing a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionEvent {
    /// A non-blank command line was extracted
    LineReceived,
    /// No complete command line was available
    NoData,
    /// The inactivity timeout elapsed
    TimedOut,
    /// The peer closed the connection or the stream failed
    Disconnected,
}

impl SessionState {
    /// Check if the session has been evicted
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Evicted)
    }

    /// Process an event and return the next state
    pub fn transition(self, event: SessionEvent) -> Self {
        use SessionEvent::*;
        use SessionState::*;

        match (self, event) {
            (Evicted, _) => Evicted,
            (_, TimedOut) | (_, Disconnected) => Evicted,
            (_, LineReceived) => Active,
            (Established, NoData) => Established,
            (Active, NoData) | (Idle, NoData) => Idle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_line_activates() {
        let state = SessionState::Established.transition(SessionEvent::LineReceived);
        assert_eq!(state, SessionState::Active);
    }

    #[test]
    fn test_active_idle_cycle() {
        let idle = SessionState::Active.transition(SessionEvent::NoData);
        assert_eq!(idle, SessionState::Idle);
        assert_eq!(idle.transition(SessionEvent::NoData), SessionState::Idle);
        assert_eq!(idle.transition(SessionEvent::LineReceived), SessionState::Active);
    }

    #[test]
    fn test_established_waits_quietly() {
        let state = SessionState::Established.transition(SessionEvent::NoData);
        assert_eq!(state, SessionState::Established);
    }

    #[test]
    fn test_eviction_is_terminal() {
        for start in [SessionState::Established, SessionState::Active, SessionState::Idle] {
            assert!(start.transition(SessionEvent::TimedOut).is_terminal());
            assert!(start.transition(SessionEvent::Disconnected).is_terminal());
        }
        let evicted = SessionState::Evicted;
        assert_eq!(evicted.transition(SessionEvent::LineReceived), SessionState::Evicted);
    }
}
