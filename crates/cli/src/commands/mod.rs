use clap::Subcommand;
use eyre::WrapErr;
use sessionkv::store::{default_factory, SupervisorConfig};
use sessionkv::{new_identifier, OptionalExt, SessionConfig, SessionManager};

#[derive(Subcommand)]
pub enum Commands {
    /// Print a freshly minted session identifier
    NewId {
        /// How many identifiers to print
        #[arg(long, short = 'n', default_value = "1")]
        count: usize,
    },
    /// Print a string field of a session
    Get {
        /// Session identifier
        session: String,
        /// Field name
        field: String,
    },
    /// Store a string field in a session
    Set {
        /// Session identifier
        session: String,
        /// Field name
        field: String,
        /// Value to store
        value: String,
    },
    /// Remove a field from a session
    Del {
        /// Session identifier
        session: String,
        /// Field name
        field: String,
    },
    /// Remove a whole session
    Destroy {
        /// Session identifier
        session: String,
    },
    /// Check that the configured backend answers
    Health,
}

impl Commands {
    pub async fn execute(self, config: SessionConfig) -> eyre::Result<()> {
        if let Commands::NewId { count } = self {
            for _ in 0..count {
                println!("{}", new_identifier());
            }
            return Ok(());
        }

        let manager = connect(config).await?;
        let result = self.run(&manager).await;
        manager.close().await?;
        result
    }

    async fn run(self, manager: &SessionManager) -> eyre::Result<()> {
        match self {
            Commands::NewId { .. } => {
                unreachable!("new-id is handled before a store is opened")
            }
            Commands::Get { session, field } => {
                let value: Option<String> = manager
                    .open(session.as_str())
                    .get(&field)
                    .await
                    .optional()?;
                match value {
                    Some(value) => {
                        println!("{value}");
                        Ok(())
                    }
                    None => Err(eyre::eyre!("field '{field}' not found in session '{session}'")),
                }
            }
            Commands::Set {
                session,
                field,
                value,
            } => {
                manager.open(session.as_str()).set(&field, &value).await?;
                tracing::info!(session = %session, field = %field, "stored field");
                Ok(())
            }
            Commands::Del { session, field } => {
                manager.open(session.as_str()).del(&field).await?;
                tracing::info!(session = %session, field = %field, "removed field");
                Ok(())
            }
            Commands::Destroy { session } => {
                manager.open(session.as_str()).destroy().await?;
                tracing::info!(session = %session, "destroyed session");
                Ok(())
            }
            Commands::Health => {
                manager.health_check().await?;
                println!(
                    "ok: {} backend at {} (reconnects: {})",
                    manager.backend_kind(),
                    manager.config().save_path,
                    manager.reconnects()
                );
                Ok(())
            }
        }
    }
}

async fn connect(config: SessionConfig) -> eyre::Result<SessionManager> {
    let factory = default_factory(&config, SupervisorConfig::default())?;
    let save_path = config.save_path.clone();
    SessionManager::new(config, factory.as_ref())
        .await
        .wrap_err_with(|| format!("failed to open session store at {save_path}"))
}
