//! Storage backend abstraction
//!
//! A [`BackendHandler`] is the manager-scoped owner of a live resource (a
//! store file or a network connection). It hands out cheap session-scoped
//! [`SessionHandler`]s, each holding an `Arc` back to the backend so the
//! backend outlives every handle derived from it.

use async_trait::async_trait;
use sessionkv_core::{Result, SessionConfig, SessionId};
use std::fmt;
use std::sync::Arc;

/// Storage operations for one session's namespace
#[async_trait]
pub trait SessionHandler: Send + Sync {
    /// The session this handle addresses
    fn session_id(&self) -> &SessionId;

    /// Raw bytes stored under `name`
    async fn get(&self, name: &str) -> Result<Vec<u8>>;

    /// Upsert `name -> value`
    async fn set(&self, name: &str, value: &[u8]) -> Result<()>;

    /// Remove `name`
    async fn del(&self, name: &str) -> Result<()>;

    /// Remove the whole session
    async fn destroy(&self) -> Result<()>;

    /// Per-session garbage collection hook; expiry is delegated by default
    async fn gc(&self) {}
}

/// Manager-scoped backend shared by all sessions
#[async_trait]
pub trait BackendHandler: Send + Sync {
    /// Bind a session-scoped handle to `id`
    fn create_session(self: Arc<Self>, id: SessionId) -> Box<dyn SessionHandler>;

    /// Which engine this is
    fn kind(&self) -> BackendKind;

    /// Reconnects performed by the backend's connection supervisor
    fn reconnects(&self) -> u64 {
        0
    }

    /// Check the backend answers a trivial request
    async fn health_check(&self) -> Result<()>;

    /// Backend-wide garbage collection hook; expiry is delegated by default
    async fn gc(&self) {}

    /// Release the underlying resource and stop background work
    async fn close(&self) -> Result<()>;
}

/// Builds a live backend from configuration
#[async_trait]
pub trait BackendFactory: Send + Sync {
    /// Construct the backend; failure here should abort startup
    async fn build(&self, config: &SessionConfig) -> Result<Arc<dyn BackendHandler>>;
}

/// The storage engines shipped with sessionkv
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Embedded ordered key/value file store
    Embedded,
    /// Network key/value cache
    Network,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Embedded => write!(f, "embedded"),
            BackendKind::Network => write!(f, "network"),
        }
    }
}
