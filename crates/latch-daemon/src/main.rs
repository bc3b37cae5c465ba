//! latch: keep the last UDP payload and serve it over HTTP.
//!
//! # Startup Sequence
//!
//! 1. Parse flags (and `LATCH_*` environment variables)
//! 2. Initialize structured logging (tracing)
//! 3. Either send one datagram (`latch send`) and exit, or
//! 4. Load and validate the configuration
//! 5. Start the supervised UDP and HTTP loops
//! 6. Run until a fatal UDP error or Ctrl-C
//!
//! # Usage
//!
//! ```bash
//! # Run the bridge with zero value "0", only accepting one sensor
//! latch --zero 0 --allowed-udp-clients 203.0.113.9
//!
//! # Push a value by hand
//! latch send 42
//!
//! # Enable debug logging
//! RUST_LOG=latch_udp=debug latch
//! ```

use clap::Parser;
use latch_daemon::cli::{Cli, Command};
use latch_daemon::{Bridge, DaemonError, logging};
use tracing::{error, info};

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the UDP socket cannot be
/// bound, or `latch send` fails.
#[tokio::main]
async fn main() -> Result<(), DaemonError> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.json_logs)?;

    if let Some(Command::Send(args)) = &cli.command {
        let n = latch_udp::send_datagram(args.target(), args.local(), args.payload().as_bytes())
            .await?;
        info!(bytes = n, target = %args.target(), "datagram sent");
        return Ok(());
    }

    info!("latch starting");
    let config = cli.serve.load_config().inspect_err(|e| {
        error!(error = %e, "invalid configuration");
    })?;
    let bridge = Bridge::start(&config)?;

    tokio::select! {
        result = bridge.wait() => {
            if let Err(e) = &result {
                error!(error = %e, "bridge stopped");
            }
            result
        }
        signal = tokio::signal::ctrl_c() => {
            match signal {
                Ok(()) => info!("interrupt received, shutting down"),
                Err(e) => error!(error = %e, "cannot listen for interrupt, shutting down"),
            }
            Ok(())
        }
    }
}
