//! Cookie-bound session state for sessionkv
//!
//! A [`SessionManager`] owns one storage backend and binds each request to a
//! [`Session`], minting an identifier and a cookie when the request carries
//! none.
//!
//! ```no_run
//! use sessionkv::{HandlerRegistry, RequestCookies, SessionConfig, SessionManager, SetCookie};
//! use sessionkv::store::{default_factory, SupervisorConfig};
//!
//! # async fn run() -> sessionkv::Result<()> {
//! let config = SessionConfig::load(None)?;
//! let registry = HandlerRegistry::new();
//! registry.register_arc(default_factory(&config, SupervisorConfig::default())?)?;
//! let manager = SessionManager::from_registry(config, &registry).await?;
//!
//! let cookies = RequestCookies::parse("SESSIONKV_ID=abc123");
//! let mut issued: Vec<SetCookie> = Vec::new();
//! let session = manager.start(&cookies, &mut issued);
//! session.set("user_id", &42u64).await?;
//! let user_id: u64 = session.get("user_id").await?;
//! # let _ = user_id;
//! # Ok(())
//! # }
//! ```

pub mod cookie;
pub mod manager;
pub mod session;

pub use cookie::{CookieSink, CookieSource, RequestCookies, SetCookie};
pub use manager::SessionManager;
pub use session::Session;

pub use sessionkv_core::{
    codec, constants, new_identifier, Error, Missing, OptionalExt, Result, SaveTarget,
    SessionConfig, SessionConfigBuilder, SessionId,
};
pub use sessionkv_store::{BackendFactory, BackendHandler, BackendKind, HandlerRegistry};

pub use sessionkv_store as store;
