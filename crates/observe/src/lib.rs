use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info,screenflow_runtime=debug";

/// Initialize a simple stdout tracing subscriber for development.
///
/// Does nothing if a global subscriber is already installed.
pub fn init_stdout_tracing() {
    if let Err(err) = try_init_stdout_tracing() {
        tracing::debug!(error = %err, "Tracing subscriber already installed");
    }
}

/// Like [`init_stdout_tracing`], but reports a second installation as an error.
pub fn try_init_stdout_tracing() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init()?;
    Ok(())
}

/// `RUST_LOG` when set, [`DEFAULT_FILTER`] otherwise.
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}
