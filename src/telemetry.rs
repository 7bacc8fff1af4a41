//! Tracing subscriber bootstrap.
//!
//! The library itself only emits `tracing` events; binaries and test
//! harnesses that want to see them call [`init_tracing`] once at startup.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// Installs the global subscriber.
///
/// `RUST_LOG` takes precedence over `config.log_level`. Output is JSON lines
/// when `config.json` is set, plain text otherwise.
///
/// # Errors
///
/// Fails when a global subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let json_layer = config.json.then(|| fmt::layer().json().with_target(true));
    let text_layer = (!config.json).then(|| fmt::layer().with_target(false));

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .try_init()
}
