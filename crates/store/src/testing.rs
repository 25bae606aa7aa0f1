//! In-memory simulation of the network backend
//!
//! [`SimulatedServer`] implements the hash/TTL command set of the network
//! backend and lets tests inject faults: failing liveness probes, refused
//! dials and severed connections. Dial [`SimulatedDialer`] against it to drive
//! the connection supervisor without a real server.

use crate::backend::{BackendFactory, BackendHandler};
use crate::network::command::{Command, Reply};
use crate::network::transport::{Connection, Dialer};
use crate::network::NetworkBackend;
use crate::supervisor::SupervisorConfig;
use async_trait::async_trait;
use parking_lot::Mutex;
use sessionkv_core::{Error, Result, SessionConfig};
use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct Record {
    fields: HashMap<String, Vec<u8>>,
    ttl: Option<Duration>,
    expires_at: Option<Instant>,
}

impl Record {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

#[derive(Debug, Default)]
struct ServerState {
    records: Mutex<HashMap<String, Record>>,
    failing_pings: AtomicU32,
    failing_expires: AtomicU32,
    refused_dials: AtomicU32,
    dials: AtomicU64,
    severed_before: AtomicU64,
    pings: AtomicU64,
    commands: AtomicU64,
}

/// Shared handle to a simulated key/value server
#[derive(Debug, Clone, Default)]
pub struct SimulatedServer {
    state: Arc<ServerState>,
}

impl SimulatedServer {
    /// Create an empty server
    pub fn new() -> Self {
        Self::default()
    }

    /// A dialer connecting to this server
    pub fn dialer(&self) -> SimulatedDialer {
        SimulatedDialer {
            server: self.clone(),
            target: "sim://session-store".to_string(),
        }
    }

    /// Fail the next `count` `PING` commands on any connection
    pub fn fail_next_pings(&self, count: u32) {
        self.state.failing_pings.store(count, Ordering::SeqCst);
    }

    /// Fail the next `count` `EXPIRE` commands on any connection
    pub fn fail_next_expires(&self, count: u32) {
        self.state.failing_expires.store(count, Ordering::SeqCst);
    }

    /// Refuse the next `count` dials
    pub fn refuse_next_dials(&self, count: u32) {
        self.state.refused_dials.store(count, Ordering::SeqCst);
    }

    /// Break every connection dialed so far; new dials are unaffected
    pub fn sever_connections(&self) {
        let dials = self.state.dials.load(Ordering::SeqCst);
        self.state.severed_before.store(dials, Ordering::SeqCst);
    }

    /// Successful dials so far
    pub fn dials(&self) -> u64 {
        self.state.dials.load(Ordering::SeqCst)
    }

    /// `PING` commands received so far, failed ones included
    pub fn pings(&self) -> u64 {
        self.state.pings.load(Ordering::SeqCst)
    }

    /// Non-probe commands executed so far
    pub fn commands(&self) -> u64 {
        self.state.commands.load(Ordering::SeqCst)
    }

    /// The TTL most recently set on `key`, if the key exists
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        let records = self.state.records.lock();
        records
            .get(key)
            .filter(|record| !record.is_expired(Instant::now()))
            .and_then(|record| record.ttl)
    }

    /// Time left before `key` expires
    pub fn remaining_ttl(&self, key: &str) -> Option<Duration> {
        let records = self.state.records.lock();
        let now = Instant::now();
        records
            .get(key)
            .and_then(|record| record.expires_at)
            .map(|at| at.saturating_duration_since(now))
    }

    /// Raw bytes stored under `key`/`field`
    pub fn field(&self, key: &str, field: &str) -> Option<Vec<u8>> {
        let records = self.state.records.lock();
        records
            .get(key)
            .filter(|record| !record.is_expired(Instant::now()))
            .and_then(|record| record.fields.get(field).cloned())
    }

    /// Whether a hash exists under `key`
    pub fn contains_key(&self, key: &str) -> bool {
        let records = self.state.records.lock();
        records
            .get(key)
            .is_some_and(|record| !record.is_expired(Instant::now()))
    }

    /// Force `key` to expire now
    pub fn expire_now(&self, key: &str) {
        let mut records = self.state.records.lock();
        if let Some(record) = records.get_mut(key) {
            record.expires_at = Some(Instant::now());
        }
    }

    fn apply(&self, command: &Command) -> Reply {
        let now = Instant::now();
        let mut records = self.state.records.lock();
        records.retain(|_, record| !record.is_expired(now));

        match command {
            Command::Ping => Reply::Status("PONG".to_string()),
            Command::HGet { key, field } => records
                .get(key)
                .and_then(|record| record.fields.get(field))
                .map_or(Reply::Nil, |value| Reply::Bytes(value.clone())),
            Command::HSet { key, field, value } => {
                let record = records.entry(key.clone()).or_default();
                let added = record.fields.insert(field.clone(), value.clone()).is_none();
                Reply::Integer(i64::from(added))
            }
            Command::HDel { key, field } => {
                let removed = match records.get_mut(key) {
                    Some(record) => record.fields.remove(field).is_some(),
                    None => false,
                };
                if records.get(key).is_some_and(|record| record.fields.is_empty()) {
                    records.remove(key);
                }
                Reply::Integer(i64::from(removed))
            }
            Command::Del { key } => Reply::Integer(i64::from(records.remove(key).is_some())),
            Command::Expire { key, seconds } => match records.get_mut(key) {
                Some(record) => {
                    let ttl = Duration::from_secs(*seconds);
                    record.ttl = Some(ttl);
                    record.expires_at = Some(now + ttl);
                    Reply::Integer(1)
                }
                None => Reply::Integer(0),
            },
        }
    }
}

/// Dialer for a [`SimulatedServer`]
#[derive(Debug, Clone)]
pub struct SimulatedDialer {
    server: SimulatedServer,
    target: String,
}

#[async_trait]
impl Dialer for SimulatedDialer {
    type Connection = SimulatedConnection;

    async fn dial(&self) -> Result<SimulatedConnection> {
        let state = &self.server.state;
        let refused = state
            .refused_dials
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if refused {
            return Err(Error::dial_failed(
                &self.target,
                io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"),
            ));
        }

        let generation = state.dials.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(SimulatedConnection {
            server: self.server.clone(),
            generation,
            closed: AtomicBool::new(false),
        })
    }

    fn target(&self) -> &str {
        &self.target
    }
}

/// One connection to a [`SimulatedServer`]
#[derive(Debug)]
pub struct SimulatedConnection {
    server: SimulatedServer,
    generation: u64,
    closed: AtomicBool,
}

impl SimulatedConnection {
    /// Dial sequence number of this connection, starting at 1
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn is_broken(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
            || self.generation <= self.server.state.severed_before.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connection for SimulatedConnection {
    async fn execute(&self, command: &Command) -> Result<Reply> {
        let state = &self.server.state;
        if matches!(command, Command::Ping) {
            state.pings.fetch_add(1, Ordering::SeqCst);
        } else {
            state.commands.fetch_add(1, Ordering::SeqCst);
        }

        if self.is_broken() {
            return Err(Error::storage_with_source(
                command.name(),
                io::Error::new(io::ErrorKind::ConnectionReset, "connection reset by peer"),
            ));
        }

        let budget = match command {
            Command::Ping => Some(&state.failing_pings),
            Command::Expire { .. } => Some(&state.failing_expires),
            _ => None,
        };
        if let Some(budget) = budget {
            let injected = budget
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if injected {
                return Err(Error::storage(command.name(), "injected failure"));
            }
        }

        Ok(self.server.apply(command))
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// Factory building network backends on top of a [`SimulatedServer`]
#[derive(Debug, Clone)]
pub struct SimulatedFactory {
    server: SimulatedServer,
    supervisor: SupervisorConfig,
}

impl SimulatedFactory {
    /// Create a factory for `server`
    pub fn new(server: SimulatedServer, supervisor: SupervisorConfig) -> Self {
        Self { server, supervisor }
    }
}

#[async_trait]
impl BackendFactory for SimulatedFactory {
    async fn build(&self, config: &SessionConfig) -> Result<Arc<dyn BackendHandler>> {
        let backend =
            NetworkBackend::connect(self.server.dialer(), config, self.supervisor.clone()).await?;
        Ok(backend)
    }
}
