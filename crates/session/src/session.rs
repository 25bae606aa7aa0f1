//! Request-scoped session handle

use sessionkv_core::{codec, Result, SessionId};
use sessionkv_store::SessionHandler;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::{self, Display};
use tracing::trace;

/// One request's view of a session
///
/// Field names are keyed by their `Display` form and values are stored as
/// encoded bytes. The identifier never changes for the lifetime of the
/// handle.
pub struct Session {
    handler: Box<dyn SessionHandler>,
    is_new: bool,
}

impl Session {
    pub(crate) fn new(handler: Box<dyn SessionHandler>, is_new: bool) -> Self {
        Self { handler, is_new }
    }

    /// The session identifier
    pub fn id(&self) -> &SessionId {
        self.handler.session_id()
    }

    /// Whether the identifier was minted for this request
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    /// Read and decode the value stored under `name`
    pub async fn get<T>(&self, name: impl Display) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let key = codec::encode_name(name);
        let bytes = self.handler.get(&key).await?;
        trace!(session = %self.id(), field = %key, bytes = bytes.len(), "read field");
        codec::decode(&bytes)
    }

    /// Encode and store `value` under `name`
    pub async fn set<T>(&self, name: impl Display, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let key = codec::encode_name(name);
        let bytes = codec::encode(value)?;
        self.handler.set(&key, &bytes).await
    }

    /// Remove `name`
    pub async fn del(&self, name: impl Display) -> Result<()> {
        self.handler.del(&codec::encode_name(name)).await
    }

    /// Remove the whole session from the backend
    pub async fn destroy(&self) -> Result<()> {
        self.handler.destroy().await
    }

    /// Per-session garbage collection; a no-op for backends that delegate expiry
    pub async fn gc(&self) {
        self.handler.gc().await;
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", self.id())
            .field("is_new", &self.is_new)
            .finish()
    }
}
