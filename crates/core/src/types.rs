//! Session identifier newtype and generator

use crate::constants::SESSION_ID_LEN;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt::{self, Display};
use std::ops::Deref;
use std::time::{SystemTime, UNIX_EPOCH};

/// An opaque session identifier
///
/// Identifiers read back from a cookie are accepted verbatim and never
/// parsed; only freshly minted ones are guaranteed to be
/// [`SESSION_ID_LEN`] hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Wrap an existing identifier without validation
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mint a new identifier
    ///
    /// Two random 64-bit values and a nanosecond timestamp are hashed with
    /// SHA-256. The random values come from the thread-local CSPRNG, so the
    /// timestamp only guards against a badly seeded source.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let first: u64 = rng.gen();
        let second: u64 = rng.gen();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();

        let mut hasher = Sha256::new();
        hasher.update(format!("{first}.{second}.{nanos}").as_bytes());
        let id = hex::encode(hasher.finalize());
        debug_assert_eq!(id.len(), SESSION_ID_LEN);

        Self(id)
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Deref for SessionId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Mint a new session identifier
pub fn new_identifier() -> SessionId {
    SessionId::generate()
}
