//! Network cache backend
//!
//! Each session is one hash record keyed by the session identifier, with one
//! hash field per session field. Every access refreshes the record's TTL to
//! `gc_max_lifetime`, giving sliding-window expiry enforced by the remote
//! store itself.

pub mod command;
pub mod redis;
pub mod transport;

pub use command::{Command, Reply};
pub use self::redis::{RedisConnection, RedisDialer};
pub use transport::{Connection, Dialer};

use crate::backend::{BackendFactory, BackendHandler, BackendKind, SessionHandler};
use crate::supervisor::{ConnectionSupervisor, SupervisorConfig, SupervisorStats};
use async_trait::async_trait;
use parking_lot::Mutex;
use sessionkv_core::{Error, Result, SessionConfig, SessionId};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Manager-scoped network backend
pub struct NetworkBackend<D: Dialer> {
    supervisor: Arc<ConnectionSupervisor<D>>,
    max_lifetime: u64,
    health_check: Mutex<Option<JoinHandle<()>>>,
}

impl<D: Dialer> NetworkBackend<D> {
    /// Dial the backend and start its health-check loop
    pub async fn connect(
        dialer: D,
        config: &SessionConfig,
        supervisor: SupervisorConfig,
    ) -> Result<Arc<Self>> {
        let supervisor = ConnectionSupervisor::connect(dialer, supervisor).await?;
        let handle = supervisor.spawn_health_check();

        Ok(Arc::new(Self {
            supervisor,
            max_lifetime: config.gc_max_lifetime,
            health_check: Mutex::new(Some(handle)),
        }))
    }

    /// The connection supervisor behind this backend
    pub fn supervisor(&self) -> &Arc<ConnectionSupervisor<D>> {
        &self.supervisor
    }

    /// Snapshot of supervisor counters
    pub fn stats(&self) -> SupervisorStats {
        self.supervisor.stats()
    }

    fn stop_health_check(&self) {
        if let Some(handle) = self.health_check.lock().take() {
            handle.abort();
        }
    }
}

impl<D: Dialer> Drop for NetworkBackend<D> {
    fn drop(&mut self) {
        self.stop_health_check();
    }
}

#[async_trait]
impl<D: Dialer> BackendHandler for NetworkBackend<D> {
    fn create_session(self: Arc<Self>, id: SessionId) -> Box<dyn SessionHandler> {
        Box::new(NetworkSession { id, backend: self })
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Network
    }

    fn reconnects(&self) -> u64 {
        self.supervisor.reconnects()
    }

    async fn health_check(&self) -> Result<()> {
        self.supervisor.execute(Command::Ping).await.map(|_| ())
    }

    async fn close(&self) -> Result<()> {
        self.stop_health_check();
        self.supervisor.close().await;
        Ok(())
    }
}

/// Session-scoped handle into a [`NetworkBackend`]
pub struct NetworkSession<D: Dialer> {
    id: SessionId,
    backend: Arc<NetworkBackend<D>>,
}

impl<D: Dialer> NetworkSession<D> {
    fn key(&self) -> String {
        self.id.as_str().to_string()
    }

    async fn run(&self, command: Command) -> Result<Reply> {
        self.backend.supervisor.execute(command).await
    }

    /// Slide the expiry window; failures never fail the primary operation
    async fn refresh_ttl(&self) {
        let command = Command::Expire {
            key: self.key(),
            seconds: self.backend.max_lifetime,
        };
        if let Err(e) = self.run(command).await {
            debug!(session = %self.id, error = %e, "ttl refresh failed");
        }
    }
}

#[async_trait]
impl<D: Dialer> SessionHandler for NetworkSession<D> {
    fn session_id(&self) -> &SessionId {
        &self.id
    }

    async fn get(&self, name: &str) -> Result<Vec<u8>> {
        let reply = self
            .run(Command::HGet {
                key: self.key(),
                field: name.to_string(),
            })
            .await?;

        let value = match reply.into_bytes() {
            Some(bytes) => bytes,
            None => return Err(Error::not_found_field(self.id.as_str(), name)),
        };

        self.refresh_ttl().await;
        Ok(value)
    }

    async fn set(&self, name: &str, value: &[u8]) -> Result<()> {
        self.run(Command::HSet {
            key: self.key(),
            field: name.to_string(),
            value: value.to_vec(),
        })
        .await?;

        self.refresh_ttl().await;
        Ok(())
    }

    async fn del(&self, name: &str) -> Result<()> {
        self.run(Command::HDel {
            key: self.key(),
            field: name.to_string(),
        })
        .await?;

        self.refresh_ttl().await;
        Ok(())
    }

    async fn destroy(&self) -> Result<()> {
        self.run(Command::Del { key: self.key() }).await?;
        Ok(())
    }
}

/// Factory for network backends reached through `tcp://`, `unix://` or `redis://`
#[derive(Debug, Clone, Default)]
pub struct NetworkStoreFactory {
    supervisor: SupervisorConfig,
}

impl NetworkStoreFactory {
    /// Create a factory with custom supervision settings
    pub fn new(supervisor: SupervisorConfig) -> Self {
        Self { supervisor }
    }
}

#[async_trait]
impl BackendFactory for NetworkStoreFactory {
    async fn build(&self, config: &SessionConfig) -> Result<Arc<dyn BackendHandler>> {
        let target = config.save_target()?;
        let dialer = RedisDialer::new(
            &target,
            self.supervisor.dial_timeout,
            self.supervisor.command_timeout,
        )?;
        let backend = NetworkBackend::connect(dialer, config, self.supervisor.clone()).await?;
        Ok(backend)
    }
}
