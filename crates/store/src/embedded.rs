//! Embedded file-store backend
//!
//! One redb database file holds every session. Each session identifier owns a
//! table, and each field name is a key inside it. Transactions are per call:
//! redb gives one writer and many concurrent readers, so this layer adds no
//! locking of its own. Calls run on the blocking pool.

use crate::backend::{BackendFactory, BackendHandler, BackendKind, SessionHandler};
use async_trait::async_trait;
use parking_lot::RwLock;
use redb::{Database, TableDefinition, TableError, TableHandle};
use sessionkv_core::{Error, Result, SessionConfig, SessionId, SCHEME_FILE};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

fn namespace(id: &str) -> TableDefinition<'_, &'static str, &'static [u8]> {
    TableDefinition::new(id)
}

fn storage_err<E>(operation: &'static str) -> impl FnOnce(E) -> Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    move |e| Error::storage_with_source(operation, e)
}

/// Manager-scoped embedded backend
pub struct EmbeddedBackend {
    db: RwLock<Option<Arc<Database>>>,
    path: PathBuf,
}

impl EmbeddedBackend {
    /// Open or create the store file at `path`
    pub async fn open(path: impl Into<PathBuf>) -> Result<Arc<Self>> {
        let path = path.into();
        let file = path.clone();

        let db = tokio::task::spawn_blocking(move || -> Result<Database> {
            if let Some(parent) = file.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(storage_err("open"))?;
            }
            Database::create(&file).map_err(storage_err("open"))
        })
        .await
        .map_err(storage_err("open"))??;

        info!(path = %path.display(), "opened embedded session store");
        Ok(Arc::new(Self {
            db: RwLock::new(Some(Arc::new(db))),
            path,
        }))
    }

    /// Location of the store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn blocking<T, F>(&self, operation: &'static str, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> Result<T> + Send + 'static,
    {
        let db = self
            .db
            .read()
            .clone()
            .ok_or_else(|| Error::storage(operation, "store closed"))?;
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(storage_err(operation))?
    }
}

#[async_trait]
impl BackendHandler for EmbeddedBackend {
    fn create_session(self: Arc<Self>, id: SessionId) -> Box<dyn SessionHandler> {
        Box::new(EmbeddedSession { id, backend: self })
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Embedded
    }

    async fn health_check(&self) -> Result<()> {
        self.blocking("health", |db| {
            db.begin_read().map_err(storage_err("health"))?;
            Ok(())
        })
        .await
    }

    /// Drop the database handle; calls still in flight finish first
    async fn close(&self) -> Result<()> {
        if self.db.write().take().is_some() {
            debug!(path = %self.path.display(), "embedded session store released");
        }
        Ok(())
    }
}

/// Session-scoped handle into an [`EmbeddedBackend`]
pub struct EmbeddedSession {
    id: SessionId,
    backend: Arc<EmbeddedBackend>,
}

impl EmbeddedSession {
    /// Table names must be non-empty, so an empty identifier never has a namespace
    fn has_namespace(&self) -> bool {
        !self.id.as_str().is_empty()
    }
}

#[async_trait]
impl SessionHandler for EmbeddedSession {
    fn session_id(&self) -> &SessionId {
        &self.id
    }

    async fn get(&self, name: &str) -> Result<Vec<u8>> {
        if !self.has_namespace() {
            return Err(Error::not_found_session(self.id.as_str()));
        }
        let sid = self.id.as_str().to_string();
        let name = name.to_string();

        self.backend
            .blocking("get", move |db| {
                let rtx = db.begin_read().map_err(storage_err("get"))?;
                let table = match rtx.open_table(namespace(&sid)) {
                    Ok(table) => table,
                    Err(TableError::TableDoesNotExist(_)) => {
                        return Err(Error::not_found_session(sid.as_str()))
                    }
                    Err(e) => return Err(Error::storage_with_source("get", e)),
                };

                let value = table.get(name.as_str()).map_err(storage_err("get"))?;
                match value {
                    Some(guard) => Ok(guard.value().to_vec()),
                    None => Err(Error::not_found_field(sid.as_str(), name.as_str())),
                }
            })
            .await
    }

    async fn set(&self, name: &str, value: &[u8]) -> Result<()> {
        if !self.has_namespace() {
            return Err(Error::storage("set", "session identifier must not be empty"));
        }
        let sid = self.id.as_str().to_string();
        let name = name.to_string();
        let value = value.to_vec();

        self.backend
            .blocking("set", move |db| {
                let wtx = db.begin_write().map_err(storage_err("set"))?;
                {
                    let mut table = wtx.open_table(namespace(&sid)).map_err(storage_err("set"))?;
                    table
                        .insert(name.as_str(), value.as_slice())
                        .map_err(storage_err("set"))?;
                }
                wtx.commit().map_err(storage_err("set"))
            })
            .await
    }

    async fn del(&self, name: &str) -> Result<()> {
        if !self.has_namespace() {
            return Err(Error::not_found_session(self.id.as_str()));
        }
        let sid = self.id.as_str().to_string();
        let name = name.to_string();

        self.backend
            .blocking("del", move |db| {
                let wtx = db.begin_write().map_err(storage_err("del"))?;
                let exists = wtx
                    .list_tables()
                    .map_err(storage_err("del"))?
                    .any(|table| table.name() == sid);
                if !exists {
                    return Err(Error::not_found_session(sid.as_str()));
                }

                {
                    let mut table = wtx.open_table(namespace(&sid)).map_err(storage_err("del"))?;
                    table.remove(name.as_str()).map_err(storage_err("del"))?;
                }
                wtx.commit().map_err(storage_err("del"))
            })
            .await
    }

    async fn destroy(&self) -> Result<()> {
        if !self.has_namespace() {
            return Ok(());
        }
        let sid = self.id.as_str().to_string();

        self.backend
            .blocking("destroy", move |db| {
                let wtx = db.begin_write().map_err(storage_err("destroy"))?;
                let existed = wtx
                    .delete_table(namespace(&sid))
                    .map_err(storage_err("destroy"))?;
                wtx.commit().map_err(storage_err("destroy"))?;
                if !existed {
                    debug!(session = %sid, "destroy on absent session");
                }
                Ok(())
            })
            .await
    }
}

/// Factory for embedded backends reached through `file://`
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedStoreFactory;

#[async_trait]
impl BackendFactory for EmbeddedStoreFactory {
    async fn build(&self, config: &SessionConfig) -> Result<Arc<dyn BackendHandler>> {
        let target = config.save_target()?;
        if target.scheme != SCHEME_FILE {
            return Err(Error::config_invalid(
                target.to_string(),
                format!("the embedded backend expects {SCHEME_FILE}://<path>"),
            ));
        }

        let backend = EmbeddedBackend::open(&target.address).await?;
        Ok(backend)
    }
}
