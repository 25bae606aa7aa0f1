//! Storage backends for sessionkv
//!
//! - **`backend`**: the manager-scoped [`BackendHandler`] and session-scoped
//!   [`SessionHandler`] traits
//! - **`embedded`**: a redb file store, one table per session
//! - **`network`**: a Redis-protocol cache, one hash per session with
//!   sliding TTL
//! - **`supervisor`**: health checking and hot reconnection of the shared
//!   network connection
//! - **`registry`**: the single-factory [`HandlerRegistry`]
//! - **`testing`**: an in-memory network server with fault injection

pub mod backend;
pub mod embedded;
pub mod network;
pub mod registry;
pub mod supervisor;
pub mod testing;

pub use backend::{BackendFactory, BackendHandler, BackendKind, SessionHandler};
pub use embedded::{EmbeddedBackend, EmbeddedStoreFactory};
pub use network::{NetworkBackend, NetworkStoreFactory, RedisDialer};
pub use registry::{default_factory, HandlerRegistry};
pub use supervisor::{
    ConnectionSupervisor, ProbeOutcome, SupervisorConfig, SupervisorState, SupervisorStats,
};
