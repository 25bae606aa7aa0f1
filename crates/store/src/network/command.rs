//! The textual key/value command set spoken to the network backend

use std::fmt;

/// A single command issued through the connection supervisor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Liveness probe
    Ping,
    /// Read one field of a session hash
    HGet { key: String, field: String },
    /// Upsert one field of a session hash
    HSet {
        key: String,
        field: String,
        value: Vec<u8>,
    },
    /// Remove one field of a session hash
    HDel { key: String, field: String },
    /// Remove a whole session hash
    Del { key: String },
    /// Set the time-to-live of a session hash in seconds
    Expire { key: String, seconds: u64 },
}

impl Command {
    /// The wire name of the command
    pub const fn name(&self) -> &'static str {
        match self {
            Command::Ping => "PING",
            Command::HGet { .. } => "HGET",
            Command::HSet { .. } => "HSET",
            Command::HDel { .. } => "HDEL",
            Command::Del { .. } => "DEL",
            Command::Expire { .. } => "EXPIRE",
        }
    }

    /// The key the command addresses, if any
    pub fn key(&self) -> Option<&str> {
        match self {
            Command::Ping => None,
            Command::HGet { key, .. }
            | Command::HSet { key, .. }
            | Command::HDel { key, .. }
            | Command::Del { key }
            | Command::Expire { key, .. } => Some(key),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Ping => write!(f, "PING"),
            Command::HGet { key, field } => write!(f, "HGET {key} {field}"),
            Command::HSet { key, field, value } => {
                write!(f, "HSET {key} {field} <{} bytes>", value.len())
            }
            Command::HDel { key, field } => write!(f, "HDEL {key} {field}"),
            Command::Del { key } => write!(f, "DEL {key}"),
            Command::Expire { key, seconds } => write!(f, "EXPIRE {key} {seconds}"),
        }
    }
}

/// A decoded reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Absent value
    Nil,
    /// Status line such as `PONG`
    Status(String),
    /// Integer reply
    Integer(i64),
    /// Binary-safe payload
    Bytes(Vec<u8>),
}

impl Reply {
    /// Take the payload, treating `Nil` as absent
    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            Reply::Bytes(bytes) => Some(bytes),
            Reply::Status(status) => Some(status.into_bytes()),
            Reply::Integer(_) | Reply::Nil => None,
        }
    }

    /// Integer value of the reply, if it is one
    pub const fn as_integer(&self) -> Option<i64> {
        match self {
            Reply::Integer(value) => Some(*value),
            _ => None,
        }
    }
}
