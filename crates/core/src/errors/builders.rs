//! Builder methods for creating errors with context

use super::types::{Error, Missing};

impl Error {
    /// Create an invalid save path error
    #[must_use]
    pub fn config_invalid(value: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ConfigInvalid {
            value: value.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with a source error
    #[must_use]
    pub fn configuration_with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Error::Configuration {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a dial error for the given target
    #[must_use]
    pub fn dial_failed(
        target: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Error::DialFailed {
            target: target.into(),
            source: source.into(),
        }
    }

    /// Create a not-found error for a missing session namespace
    #[must_use]
    pub fn not_found_session(session: impl Into<String>) -> Self {
        Error::NotFound {
            session: session.into(),
            missing: Missing::Session,
        }
    }

    /// Create a not-found error for a missing field
    #[must_use]
    pub fn not_found_field(session: impl Into<String>, field: impl Into<String>) -> Self {
        Error::NotFound {
            session: session.into(),
            missing: Missing::Field(field.into()),
        }
    }

    /// Create a storage command error
    #[must_use]
    pub fn storage(command: impl Into<String>, message: impl Into<String>) -> Self {
        Error::StorageCommandFailed {
            command: command.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a storage command error with a source error
    #[must_use]
    pub fn storage_with_source<E>(command: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::StorageCommandFailed {
            command: command.into(),
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }
}
