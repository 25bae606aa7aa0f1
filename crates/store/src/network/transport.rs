//! Transport seam between the connection supervisor and a concrete client

use super::command::{Command, Reply};
use async_trait::async_trait;
use sessionkv_core::Result;

/// A live connection able to execute commands through a shared reference
///
/// Implementations must be safe to call from many tasks at once; the
/// supervisor only ever hands out `&self`.
#[async_trait]
pub trait Connection: Send + Sync + 'static {
    /// Execute one command and return its reply or a storage error
    async fn execute(&self, command: &Command) -> Result<Reply>;

    /// Release the connection; later calls are expected to fail
    async fn close(&self) {}
}

/// Opens new connections to one fixed target
#[async_trait]
pub trait Dialer: Send + Sync + 'static {
    type Connection: Connection;

    /// Open a fresh connection, failing with `DialFailed`
    async fn dial(&self) -> Result<Self::Connection>;

    /// Human-readable target, used in logs and errors
    fn target(&self) -> &str;
}
