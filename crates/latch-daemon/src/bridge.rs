//! Wiring of the two supervised network loops.
//!
//! [`Bridge::start`] creates the shared [`StateHolder`] and spawns one
//! task per loop into a [`JoinSet`]. Each task runs a [`Supervisor`] that
//! only finishes on a fatal error, so the first task to complete decides
//! the process outcome. Dropping the bridge aborts both loops.

use std::sync::Arc;

use latch_core::{LatchConfig, StateHolder, Supervisor};
use latch_http::{AppState, ServerConfig, ServerError, start_server};
use latch_udp::{IngestConfig, UdpError, run_udp_server};
use tokio::task::JoinSet;
use tracing::info;

use crate::error::DaemonError;

/// Why a supervised task finished.
#[derive(Debug)]
enum ServiceExit {
    Udp(UdpError),
    /// Never produced while every [`ServerError`] reports itself as
    /// recoverable: the HTTP supervisor restarts forever instead.
    Http(ServerError),
}

/// A running bridge: both loops plus the state they share.
#[derive(Debug)]
pub struct Bridge {
    holder: Arc<StateHolder>,
    tasks: JoinSet<ServiceExit>,
}

impl Bridge {
    /// Validate `config` and spawn the UDP and HTTP loops.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(config: &LatchConfig) -> Result<Self, DaemonError> {
        config.validate()?;
        let cooldown = config.restart_cooldown();
        let ingest = IngestConfig::from_config(config)?;
        let server = ServerConfig::from_config(config)?;
        let credentials = config.credentials();

        info!(
            udp_addr = %ingest.addr,
            http_addr = %server.addr,
            zero = config.zero,
            auth_enabled = credentials.is_some(),
            cooldown_ms = cooldown.as_millis(),
            "starting bridge"
        );

        let holder = Arc::new(StateHolder::new(config.zero.clone()));
        let app = Arc::new(AppState::with_credentials(
            Arc::clone(&holder),
            credentials.as_ref(),
        ));
        let mut tasks = JoinSet::new();

        let udp_holder = Arc::clone(&holder);
        tasks.spawn(async move {
            let supervisor = Supervisor::new("udp", cooldown);
            let fatal = supervisor
                .run(|| run_udp_server(ingest.clone(), &udp_holder))
                .await;
            ServiceExit::Udp(fatal)
        });

        tasks.spawn(async move {
            let supervisor = Supervisor::new("http", cooldown);
            let fatal = supervisor
                .run(|| start_server(&server, Arc::clone(&app)))
                .await;
            ServiceExit::Http(fatal)
        });

        Ok(Self { holder, tasks })
    }

    /// The state shared by both loops.
    pub const fn holder(&self) -> &Arc<StateHolder> {
        &self.holder
    }

    /// Wait until a supervised loop gives up, then stop the other one.
    ///
    /// In steady state this never returns: both supervisors restart their
    /// loops forever. A fatal UDP error (the socket cannot be bound) ends
    /// the bridge, since serving stale state with no data feed is pointless.
    pub async fn wait(mut self) -> Result<(), DaemonError> {
        let exit = self.tasks.join_next().await;
        self.tasks.abort_all();

        match exit {
            Some(Ok(ServiceExit::Udp(source))) => Err(DaemonError::Udp { source }),
            // Unreachable today, see `ServiceExit::Http`.
            Some(Ok(ServiceExit::Http(source))) => Err(DaemonError::Http { source }),
            Some(Err(e)) => Err(DaemonError::Task {
                message: e.to_string(),
            }),
            None => Ok(()),
        }
    }
}
