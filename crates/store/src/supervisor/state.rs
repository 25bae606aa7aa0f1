//! Supervisor state and probe outcomes

use std::sync::atomic::{AtomicU8, Ordering};

/// Where the supervisor is in its health-check cycle
///
/// There is no failed state: callers are always served by whatever
/// connection is currently installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    /// Serving commands on the installed connection
    Connected,
    /// A liveness probe cycle is running
    Probing,
    /// The probe threshold was exceeded and a fresh connection is being dialed
    Reconnecting,
}

impl SupervisorState {
    const fn as_u8(self) -> u8 {
        match self {
            SupervisorState::Connected => 0,
            SupervisorState::Probing => 1,
            SupervisorState::Reconnecting => 2,
        }
    }

    const fn from_u8(value: u8) -> Self {
        match value {
            1 => SupervisorState::Probing,
            2 => SupervisorState::Reconnecting,
            _ => SupervisorState::Connected,
        }
    }
}

/// Lock-free cell holding the current state
#[derive(Debug)]
pub(crate) struct StateCell(AtomicU8);

impl StateCell {
    pub(crate) fn new(state: SupervisorState) -> Self {
        Self(AtomicU8::new(state.as_u8()))
    }

    pub(crate) fn get(&self) -> SupervisorState {
        SupervisorState::from_u8(self.0.load(Ordering::SeqCst))
    }

    pub(crate) fn set(&self, state: SupervisorState) {
        self.0.store(state.as_u8(), Ordering::SeqCst);
    }
}

/// Result of one health-check cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// A probe succeeded after `failures` failed attempts
    Healthy { failures: u32 },
    /// The threshold was reached and a new connection is installed
    Reconnected,
    /// The threshold was reached but dialing failed; the old connection stays
    ReconnectFailed,
}
