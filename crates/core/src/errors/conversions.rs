//! Conversion implementations for error types

use super::types::Error;

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::Configuration {
            message: format!("invalid JSON configuration: {error}"),
            source: Some(Box::new(error)),
        }
    }
}
