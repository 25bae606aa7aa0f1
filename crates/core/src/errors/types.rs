use std::fmt;

/// Result type alias for sessionkv operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for sessionkv operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The connection target could not be parsed
    #[error("invalid save path '{value}': {message}")]
    ConfigInvalid { value: String, message: String },

    /// A configuration source could not be loaded or holds a bad value
    #[error("configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Opening a connection (or store file) failed, initially or on reconnect
    #[error("failed to connect to '{target}': {source}")]
    DialFailed {
        target: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// No backend factory has been registered
    #[error("no session backend has been registered")]
    NotConfigured,

    /// A backend factory was registered twice
    #[error("a session backend is already registered")]
    AlreadyRegistered,

    /// The session namespace or one of its fields does not exist
    #[error("{missing} not found in session '{session}'")]
    NotFound { session: String, missing: Missing },

    /// A value could not be serialized
    #[error("failed to encode session value: {source}")]
    Encoding {
        #[source]
        source: bincode::Error,
    },

    /// Stored bytes are malformed or do not match the requested shape
    #[error("failed to decode session value: {source}")]
    Decoding {
        #[source]
        source: bincode::Error,
    },

    /// Any backend command failure not otherwise classified
    #[error("storage command {command} failed: {message}")]
    StorageCommandFailed {
        command: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

/// Which part of a session lookup came back empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Missing {
    /// The whole session namespace is absent
    Session,
    /// The namespace exists but the named field does not
    Field(String),
}

impl fmt::Display for Missing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Missing::Session => write!(f, "session namespace"),
            Missing::Field(name) => write!(f, "field '{name}'"),
        }
    }
}

impl Error {
    /// Whether this error reports a missing session or field
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// Whether this error came from a failed storage command
    #[must_use]
    pub const fn is_storage(&self) -> bool {
        matches!(self, Error::StorageCommandFailed { .. })
    }

    /// The missing part for a `NotFound` error
    #[must_use]
    pub const fn missing(&self) -> Option<&Missing> {
        match self {
            Error::NotFound { missing, .. } => Some(missing),
            _ => None,
        }
    }
}
