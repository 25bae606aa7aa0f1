//! Backend factory registry
//!
//! Exactly one [`BackendFactory`] may be installed in a [`HandlerRegistry`].
//! The registry is an ordinary value: create one at startup, register the
//! factory, and hand it to whoever constructs session managers.

use crate::backend::{BackendFactory, BackendHandler};
use crate::embedded::EmbeddedStoreFactory;
use crate::network::NetworkStoreFactory;
use crate::supervisor::SupervisorConfig;
use sessionkv_core::{
    Error, Result, SaveTarget, SessionConfig, SCHEME_FILE, SCHEME_REDIS, SCHEME_TCP, SCHEME_UNIX,
};
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::{debug, warn};

/// Holds the single backend factory used to build manager-scoped handlers
#[derive(Default)]
pub struct HandlerRegistry {
    factory: OnceLock<Arc<dyn BackendFactory>>,
}

impl HandlerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with `factory` already installed
    pub fn with_factory(factory: impl BackendFactory + 'static) -> Self {
        let registry = Self::new();
        let _ = registry.factory.set(Arc::new(factory));
        registry
    }

    /// Install the factory
    ///
    /// A second registration is rejected with `AlreadyRegistered` and the
    /// first factory stays installed.
    pub fn register(&self, factory: impl BackendFactory + 'static) -> Result<()> {
        self.register_arc(Arc::new(factory))
    }

    /// Install an already shared factory
    pub fn register_arc(&self, factory: Arc<dyn BackendFactory>) -> Result<()> {
        self.factory.set(factory).map_err(|_| {
            warn!("backend factory already registered");
            Error::AlreadyRegistered
        })?;
        debug!("backend factory registered");
        Ok(())
    }

    /// Whether a factory has been installed
    pub fn is_registered(&self) -> bool {
        self.factory.get().is_some()
    }

    /// Build a manager-scoped handler through the registered factory
    pub async fn construct(&self, config: &SessionConfig) -> Result<Arc<dyn BackendHandler>> {
        let factory = self.factory.get().ok_or(Error::NotConfigured)?;
        factory.build(config).await
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("registered", &self.is_registered())
            .finish()
    }
}

/// The factory serving `config`'s save path scheme
///
/// `tcp`, `unix` and `redis` select the network backend; `file` selects the
/// embedded backend.
pub fn default_factory(
    config: &SessionConfig,
    supervisor: SupervisorConfig,
) -> Result<Arc<dyn BackendFactory>> {
    let target = config.save_target()?;
    factory_for(&target, supervisor)
}

fn factory_for(target: &SaveTarget, supervisor: SupervisorConfig) -> Result<Arc<dyn BackendFactory>> {
    match target.scheme.as_str() {
        SCHEME_TCP | SCHEME_UNIX | SCHEME_REDIS => Ok(Arc::new(NetworkStoreFactory::new(supervisor))),
        SCHEME_FILE => Ok(Arc::new(EmbeddedStoreFactory)),
        other => Err(Error::config_invalid(
            target.to_string(),
            format!("unsupported scheme '{other}'"),
        )),
    }
}
