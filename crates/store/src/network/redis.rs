//! Redis-protocol transport

use super::command::{Command, Reply};
use super::transport::{Connection, Dialer};
use ::redis::aio::MultiplexedConnection;
use ::redis::{Client, Cmd};
use async_trait::async_trait;
use parking_lot::Mutex;
use sessionkv_core::{Error, Result, SaveTarget, SCHEME_REDIS, SCHEME_TCP, SCHEME_UNIX};
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;
use tracing::trace;

/// Dials multiplexed connections to a Redis-compatible server
#[derive(Debug, Clone)]
pub struct RedisDialer {
    client: Client,
    target: String,
    dial_timeout: Duration,
    command_timeout: Duration,
}

impl RedisDialer {
    /// Build a dialer for a `tcp://`, `unix://` or `redis://` target
    pub fn new(
        target: &SaveTarget,
        dial_timeout: Duration,
        command_timeout: Duration,
    ) -> Result<Self> {
        let url = connection_url(target)?;
        let client = Client::open(url.as_str())
            .map_err(|e| Error::config_invalid(target.to_string(), e.to_string()))?;

        Ok(Self {
            client,
            target: target.to_string(),
            dial_timeout,
            command_timeout,
        })
    }
}

fn connection_url(target: &SaveTarget) -> Result<String> {
    match target.scheme.as_str() {
        SCHEME_TCP | SCHEME_REDIS => Ok(format!("redis://{}", target.address)),
        SCHEME_UNIX => Ok(format!("redis+unix://{}", target.address)),
        other => Err(Error::config_invalid(
            target.to_string(),
            format!("scheme '{other}' is not served by the network backend"),
        )),
    }
}

#[async_trait]
impl Dialer for RedisDialer {
    type Connection = RedisConnection;

    async fn dial(&self) -> Result<RedisConnection> {
        let connection = timeout(
            self.dial_timeout,
            self.client.get_multiplexed_async_connection(),
        )
        .await
        .map_err(|elapsed| Error::dial_failed(&self.target, elapsed))?
        .map_err(|e| Error::dial_failed(&self.target, e))?;

        Ok(RedisConnection {
            inner: Mutex::new(Some(connection)),
            command_timeout: self.command_timeout,
        })
    }

    fn target(&self) -> &str {
        &self.target
    }
}

/// One multiplexed connection
///
/// The multiplexed handle is cheap to clone, so each command works on its own
/// clone and many commands can be in flight at once.
pub struct RedisConnection {
    inner: Mutex<Option<MultiplexedConnection>>,
    command_timeout: Duration,
}

impl RedisConnection {
    fn handle(&self, command: &Command) -> Result<MultiplexedConnection> {
        self.inner
            .lock()
            .clone()
            .ok_or_else(|| Error::storage(command.name(), "connection closed"))
    }

    async fn bounded<T: Send>(
        &self,
        command: &Command,
        request: impl Future<Output = ::redis::RedisResult<T>> + Send,
    ) -> Result<T> {
        timeout(self.command_timeout, request)
            .await
            .map_err(|elapsed| Error::storage_with_source(command.name(), elapsed))?
            .map_err(|e| Error::storage_with_source(command.name(), e))
    }
}

fn to_cmd(command: &Command) -> Cmd {
    let mut cmd = ::redis::cmd(command.name());
    match command {
        Command::Ping => {}
        Command::HGet { key, field } | Command::HDel { key, field } => {
            cmd.arg(key).arg(field);
        }
        Command::HSet { key, field, value } => {
            cmd.arg(key).arg(field).arg(value.as_slice());
        }
        Command::Del { key } => {
            cmd.arg(key);
        }
        Command::Expire { key, seconds } => {
            cmd.arg(key).arg(*seconds);
        }
    }
    cmd
}

#[async_trait]
impl Connection for RedisConnection {
    async fn execute(&self, command: &Command) -> Result<Reply> {
        let mut conn = self.handle(command)?;
        let cmd = to_cmd(command);
        trace!(command = %command, "sending command");

        match command {
            Command::Ping => {
                let status: String = self.bounded(command, cmd.query_async(&mut conn)).await?;
                Ok(Reply::Status(status))
            }
            Command::HGet { .. } => {
                let value: Option<Vec<u8>> =
                    self.bounded(command, cmd.query_async(&mut conn)).await?;
                Ok(value.map_or(Reply::Nil, Reply::Bytes))
            }
            Command::HSet { .. }
            | Command::HDel { .. }
            | Command::Del { .. }
            | Command::Expire { .. } => {
                let count: i64 = self.bounded(command, cmd.query_async(&mut conn)).await?;
                Ok(Reply::Integer(count))
            }
        }
    }

    async fn close(&self) {
        self.inner.lock().take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(save_path: &str) -> SaveTarget {
        SaveTarget::parse(save_path).unwrap()
    }

    #[test]
    fn test_connection_url_per_scheme() {
        assert_eq!(
            connection_url(&target("tcp://127.0.0.1:6379")).unwrap(),
            "redis://127.0.0.1:6379"
        );
        assert_eq!(
            connection_url(&target("redis://cache:6380")).unwrap(),
            "redis://cache:6380"
        );
        assert_eq!(
            connection_url(&target("unix:///var/run/redis.sock")).unwrap(),
            "redis+unix:///var/run/redis.sock"
        );
    }

    #[test]
    fn test_unknown_scheme_is_rejected() {
        let err = connection_url(&target("file:///tmp/sessions.db")).unwrap_err();
        assert!(matches!(err, Error::ConfigInvalid { .. }));
    }

    #[test]
    fn test_dialer_keeps_target_text() {
        let dialer = RedisDialer::new(
            &target("tcp://127.0.0.1:6379"),
            Duration::from_secs(1),
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(dialer.target(), "tcp://127.0.0.1:6379");
    }

    #[tokio::test]
    async fn test_closed_connection_rejects_commands() {
        let connection = RedisConnection {
            inner: Mutex::new(None),
            command_timeout: Duration::from_secs(1),
        };
        let err = connection.execute(&Command::Ping).await.unwrap_err();
        assert!(err.is_storage());
    }
}
