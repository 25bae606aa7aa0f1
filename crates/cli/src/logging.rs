use sessionkv::constants::SESSIONKV_LOG_VAR;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber
///
/// The filter comes from `SESSIONKV_LOG` (for example
/// `sessionkv_store=debug`) and defaults to `info`. Events go to stderr so
/// command output on stdout stays clean.
pub fn init(verbose: bool) -> eyre::Result<()> {
    let default = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_env(SESSIONKV_LOG_VAR).or_else(|_| EnvFilter::try_new(default))?;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::IsTerminal::is_terminal(&std::io::stderr()))
        .compact()
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
