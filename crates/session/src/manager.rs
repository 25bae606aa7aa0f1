//! Session manager
//!
//! Binds identifiers to the manager-scoped backend. The backend is built
//! once, at construction; a construction failure is the one error callers
//! should treat as fatal.

use crate::cookie::{CookieSink, CookieSource, SetCookie};
use crate::session::Session;
use rand::Rng;
use sessionkv_core::{Result, SessionConfig, SessionId};
use sessionkv_store::{BackendFactory, BackendHandler, BackendKind, HandlerRegistry};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Entry point for session handling
#[derive(Clone)]
pub struct SessionManager {
    config: Arc<SessionConfig>,
    backend: Arc<dyn BackendHandler>,
}

impl SessionManager {
    /// Validate `config` and build the backend through `factory`
    pub async fn new(config: SessionConfig, factory: &dyn BackendFactory) -> Result<Self> {
        config.validate()?;
        let backend = factory.build(&config).await?;
        Ok(Self::with_backend(config, backend))
    }

    /// Validate `config` and build the backend through the registered factory
    pub async fn from_registry(config: SessionConfig, registry: &HandlerRegistry) -> Result<Self> {
        config.validate()?;
        let backend = registry.construct(&config).await?;
        Ok(Self::with_backend(config, backend))
    }

    /// Wrap an already constructed backend
    pub fn with_backend(config: SessionConfig, backend: Arc<dyn BackendHandler>) -> Self {
        info!(
            backend = %backend.kind(),
            save_path = %config.save_path,
            cookie = %config.session_name,
            "session manager ready"
        );
        Self {
            config: Arc::new(config),
            backend,
        }
    }

    /// The shared configuration
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Which backend is active
    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// Resolve the request's identifier
    ///
    /// Reuses the session cookie verbatim when it is present and non-empty.
    /// Otherwise a new identifier is minted and a cookie for it is queued on
    /// `sink`. The flag is `true` for a minted identifier.
    pub fn resolve<C, S>(&self, cookies: &C, sink: &mut S) -> (SessionId, bool)
    where
        C: CookieSource + ?Sized,
        S: CookieSink + ?Sized,
    {
        match cookies.cookie(&self.config.session_name) {
            Some(value) if !value.is_empty() => (SessionId::new(value), false),
            _ => {
                let id = SessionId::generate();
                sink.set_cookie(SetCookie {
                    name: self.config.session_name.clone(),
                    value: id.to_string(),
                    domain: self.config.cookie_domain.clone(),
                    max_age: self.config.cookie_lifetime,
                });
                debug!(session = %id, "minted session");
                (id, true)
            }
        }
    }

    /// Resolve the identifier and bind it to the backend
    pub fn start<C, S>(&self, cookies: &C, sink: &mut S) -> Session
    where
        C: CookieSource + ?Sized,
        S: CookieSink + ?Sized,
    {
        let (id, is_new) = self.resolve(cookies, sink);
        Session::new(Arc::clone(&self.backend).create_session(id), is_new)
    }

    /// Bind a known identifier, skipping cookie handling
    pub fn open(&self, id: impl Into<SessionId>) -> Session {
        Session::new(Arc::clone(&self.backend).create_session(id.into()), false)
    }

    /// Reconnects performed by the backend's connection supervisor
    pub fn reconnects(&self) -> u64 {
        self.backend.reconnects()
    }

    /// Run backend-wide GC with probability `gc_probability / gc_divisor`
    ///
    /// Returns whether the sample hit.
    pub async fn collect_garbage(&self) -> bool {
        let (probability, divisor) = (self.config.gc_probability, self.config.gc_divisor);
        if divisor == 0 || probability == 0 {
            return false;
        }
        let hit = rand::thread_rng().gen_range(0..divisor) < probability;
        if hit {
            debug!(backend = %self.backend.kind(), "running session gc");
            self.backend.gc().await;
        }
        hit
    }

    /// Check the backend answers
    pub async fn health_check(&self) -> Result<()> {
        self.backend.health_check().await
    }

    /// Release the backend
    pub async fn close(&self) -> Result<()> {
        self.backend.close().await
    }
}

impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .field("config", &self.config)
            .field("backend", &self.backend.kind())
            .finish()
    }
}
