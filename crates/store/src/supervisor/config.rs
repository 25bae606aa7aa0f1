//! Tunables for connection supervision

use std::time::Duration;

/// Default idle time between health-check cycles (1s)
const DEFAULT_PROBE_INTERVAL: Duration = Duration::from_secs(1);

/// Default number of consecutive probe failures that triggers a reconnect
const DEFAULT_FAILURE_THRESHOLD: u32 = 10;

/// Default dial timeout (5s)
const DEFAULT_DIAL_TIMEOUT: Duration = Duration::from_secs(5);

/// Default per-command read/write timeout (5s)
const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for connection supervision
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// Sleep between health-check cycles
    pub probe_interval: Duration,
    /// Consecutive probe failures before a reconnect is attempted
    pub failure_threshold: u32,
    /// Upper bound on opening a connection
    pub dial_timeout: Duration,
    /// Upper bound on a single command round trip
    pub command_timeout: Duration,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            probe_interval: DEFAULT_PROBE_INTERVAL,
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            dial_timeout: DEFAULT_DIAL_TIMEOUT,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }
}

impl SupervisorConfig {
    /// Set the probe interval
    pub fn with_probe_interval(mut self, interval: Duration) -> Self {
        self.probe_interval = interval;
        self
    }

    /// Set the failure threshold; values below 1 are raised to 1
    pub fn with_failure_threshold(mut self, threshold: u32) -> Self {
        self.failure_threshold = threshold.max(1);
        self
    }

    /// Set dial and command timeouts
    pub fn with_timeouts(mut self, dial: Duration, command: Duration) -> Self {
        self.dial_timeout = dial;
        self.command_timeout = command;
        self
    }
}
