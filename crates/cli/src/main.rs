use clap::Parser;
use std::path::PathBuf;

mod commands;
mod logging;

use commands::Commands;

#[derive(Parser)]
#[command(name = "sessionkv")]
#[command(about = "Inspect and edit sessionkv session stores", long_about = None)]
#[command(version)]
struct Cli {
    /// JSON configuration file, applied before SESSIONKV_* variables
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Override the connection target (tcp://, unix://, redis:// or file://)
    #[arg(long, global = true)]
    save_path: Option<String>,

    /// Log at debug level unless SESSIONKV_LOG says otherwise
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    let mut config = sessionkv::SessionConfig::load(cli.config.as_deref())?;
    if let Some(save_path) = cli.save_path {
        config.save_path = save_path;
    }

    cli.command.execute(config).await
}
