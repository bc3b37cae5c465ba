//! Structured logging setup.

use tracing_subscriber::EnvFilter;

use crate::error::DaemonError;

/// Pick the log filter: `RUST_LOG` when set, otherwise `debug` for
/// `--verbose` and `info` by default.
pub fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "debug" } else { "info" })
    })
}

/// Install the global tracing subscriber.
pub fn init(verbose: bool, json: bool) -> Result<(), DaemonError> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_target(true);

    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| DaemonError::Logging {
        message: e.to_string(),
    })
}
