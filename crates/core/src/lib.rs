//! Core domain types, errors, and constants for `sessionkv`.
//!
//! ## Key Components
//!
//! - **`errors`**: the primary `Error` enum and `Result` alias shared by every
//!   backend and the session manager.
//! - **`config`**: the layered [`SessionConfig`] and connection target parsing.
//! - **`types`**: the opaque [`SessionId`] and its generator.
//! - **`codec`**: the stateless value encoder used for session fields.
//! - **`constants`**: defaults and environment variable names.

pub mod codec;
pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

pub use self::{
    config::{SaveTarget, SessionConfig, SessionConfigBuilder},
    constants::*,
    errors::{Error, Missing, OptionalExt, Result, ResultExt},
    types::{new_identifier, SessionId},
};
