//! Connection supervision for the network backend
//!
//! A [`ConnectionSupervisor`] owns the single live connection to the remote
//! store. Every command goes through [`ConnectionSupervisor::execute`], which
//! holds a shared lock on the connection slot for the duration of the round
//! trip. A background task probes the connection with `PING`; once the
//! failure threshold is reached it dials a replacement and swaps it in under
//! the exclusive lock, so readers never observe a half-replaced connection
//! and the swap waits for in-flight commands to finish.
//!
//! ## Architecture
//!
//! - [`config`] - probe interval, failure threshold, transport timeouts
//! - [`state`] - the `Connected` / `Probing` / `Reconnecting` cycle
//! - [`metrics`] - reconnect and probe counters
//!
//! Recovery is best effort. A failed reconnect dial leaves the old connection
//! installed and the next cycle tries again; callers are never blocked on
//! recovery and their failed commands are not retried on their behalf.

pub mod config;
pub mod metrics;
pub mod state;
#[cfg(test)]
mod tests;

pub use config::SupervisorConfig;
pub use metrics::SupervisorStats;
pub use state::{ProbeOutcome, SupervisorState};

use crate::network::command::{Command, Reply};
use crate::network::transport::{Connection, Dialer};
use metrics::SupervisorMetrics;
use sessionkv_core::Result;
use state::StateCell;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Weak};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Owner of the shared connection to a network backend
pub struct ConnectionSupervisor<D: Dialer> {
    dialer: D,
    connection: RwLock<D::Connection>,
    config: SupervisorConfig,
    metrics: SupervisorMetrics,
    state: StateCell,
}

impl<D: Dialer> ConnectionSupervisor<D> {
    /// Dial the initial connection
    ///
    /// Fails with `DialFailed` if the target cannot be reached; no background
    /// task is started until [`spawn_health_check`](Self::spawn_health_check).
    pub async fn connect(dialer: D, config: SupervisorConfig) -> Result<Arc<Self>> {
        let connection = dialer.dial().await?;
        info!(endpoint = dialer.target(), "connected to session backend");

        Ok(Arc::new(Self {
            dialer,
            connection: RwLock::new(connection),
            config,
            metrics: SupervisorMetrics::default(),
            state: StateCell::new(SupervisorState::Connected),
        }))
    }

    /// Start the perpetual health-check loop
    ///
    /// The task holds only a weak reference and exits once the supervisor is
    /// dropped.
    pub fn spawn_health_check(self: &Arc<Self>) -> JoinHandle<()> {
        let supervisor: Weak<Self> = Arc::downgrade(self);
        let interval = self.config.probe_interval;

        tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                let Some(supervisor) = supervisor.upgrade() else {
                    debug!("supervisor dropped, stopping health check");
                    break;
                };
                supervisor.probe_once().await;
            }
        })
    }

    /// Execute one caller command on the current connection
    ///
    /// A broken connection fails the command immediately; it is not retried.
    pub async fn execute(&self, command: Command) -> Result<Reply> {
        let connection = self.connection.read().await;
        connection.execute(&command).await
    }

    /// Run one health-check cycle
    ///
    /// Probes up to `failure_threshold` times back to back, taking the shared
    /// lock only for each individual attempt. Reaching the threshold triggers
    /// a reconnect.
    pub async fn probe_once(&self) -> ProbeOutcome {
        self.state.set(SupervisorState::Probing);
        let threshold = self.config.failure_threshold.max(1);

        let mut failures = 0;
        while failures < threshold {
            let probe = {
                let connection = self.connection.read().await;
                connection.execute(&Command::Ping).await
            };

            match probe {
                Ok(_) => {
                    self.metrics.consecutive_failures.store(0, Ordering::SeqCst);
                    self.finish_cycle();
                    return ProbeOutcome::Healthy { failures };
                }
                Err(e) => {
                    failures += 1;
                    self.metrics
                        .consecutive_failures
                        .store(failures, Ordering::SeqCst);
                    debug!(
                        endpoint = self.dialer.target(),
                        failures,
                        threshold,
                        error = %e,
                        "liveness probe failed"
                    );
                }
            }
        }

        warn!(
            endpoint = self.dialer.target(),
            failures, "liveness probe threshold reached, reconnecting"
        );
        let outcome = self.reconnect().await;
        self.finish_cycle();
        outcome
    }

    async fn reconnect(&self) -> ProbeOutcome {
        self.state.set(SupervisorState::Reconnecting);

        let fresh = match self.dialer.dial().await {
            Ok(connection) => connection,
            Err(e) => {
                self.metrics.failed_reconnects.fetch_add(1, Ordering::SeqCst);
                warn!(
                    endpoint = self.dialer.target(),
                    error = %e,
                    "reconnect failed, keeping current connection"
                );
                return ProbeOutcome::ReconnectFailed;
            }
        };

        {
            let mut slot = self.connection.write().await;
            let stale = std::mem::replace(&mut *slot, fresh);
            stale.close().await;
        }

        self.metrics.consecutive_failures.store(0, Ordering::SeqCst);
        let reconnects = self.metrics.reconnects.fetch_add(1, Ordering::SeqCst) + 1;
        info!(
            endpoint = self.dialer.target(),
            reconnects, "reconnected to session backend"
        );
        ProbeOutcome::Reconnected
    }

    fn finish_cycle(&self) {
        self.metrics.probe_cycles.fetch_add(1, Ordering::SeqCst);
        self.state.set(SupervisorState::Connected);
    }

    /// Number of connections swapped in since the initial dial
    pub fn reconnects(&self) -> u64 {
        self.metrics.reconnects.load(Ordering::SeqCst)
    }

    /// Snapshot of supervisor counters
    pub fn stats(&self) -> SupervisorStats {
        self.metrics.stats()
    }

    /// Current position in the health-check cycle
    pub fn state(&self) -> SupervisorState {
        self.state.get()
    }

    /// The configured target
    pub fn target(&self) -> &str {
        self.dialer.target()
    }

    /// Supervisor configuration
    pub fn config(&self) -> &SupervisorConfig {
        &self.config
    }

    /// Close the current connection
    ///
    /// Waits for in-flight commands. Later commands fail until the next
    /// successful reconnect, if a health-check loop is still running.
    pub async fn close(&self) {
        let connection = self.connection.write().await;
        connection.close().await;
    }
}
