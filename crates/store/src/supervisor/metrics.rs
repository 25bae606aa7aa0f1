//! Counters kept by the connection supervisor

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

/// Internal counters; only the reconnect count is part of the public contract
#[derive(Debug, Default)]
pub(crate) struct SupervisorMetrics {
    pub consecutive_failures: AtomicU32,
    pub reconnects: AtomicU64,
    pub failed_reconnects: AtomicU64,
    pub probe_cycles: AtomicU64,
}

impl SupervisorMetrics {
    pub(crate) fn stats(&self) -> SupervisorStats {
        SupervisorStats {
            reconnects: self.reconnects.load(Ordering::SeqCst),
            failed_reconnects: self.failed_reconnects.load(Ordering::SeqCst),
            probe_cycles: self.probe_cycles.load(Ordering::SeqCst),
        }
    }
}

/// Snapshot of supervisor counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SupervisorStats {
    /// Connections successfully swapped in after the initial dial
    pub reconnects: u64,
    /// Reconnect dials that failed
    pub failed_reconnects: u64,
    /// Completed health-check cycles
    pub probe_cycles: u64,
}
