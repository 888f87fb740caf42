//! Logging setup
//!
//! The helper reserves stdout for command payloads, so every log line goes to
//! stderr and the default level stays quiet enough that a failing command's
//! stderr is just its error message.

use gem_keychain_core::LOG_VAR;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub use tracing::{debug, error, info, instrument, trace, warn};

const DEFAULT_FILTER: &str = "warn";

/// Initialize the tracing system, filtered by `GEM_KEYCHAIN_LOG`
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let filter = EnvFilter::try_from_env(LOG_VAR).or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))?;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
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
