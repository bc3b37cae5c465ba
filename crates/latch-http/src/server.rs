//! HTTP server lifecycle management.
//!
//! [`start_server`] binds and serves until the process ends.
//! [`serve_until`] does the same but returns once a shutdown future
//! resolves, which the supervisor treats as a clean return and restarts.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use latch_core::{ConfigError, LatchConfig};
use tokio::net::TcpListener;
use tracing::info;

use crate::error::ServerError;
use crate::router::build_router;
use crate::state::AppState;

/// Configuration for the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// The address to bind.
    pub addr: SocketAddr,
}

impl ServerConfig {
    /// Extract the HTTP settings from the bridge configuration.
    pub fn from_config(config: &LatchConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            addr: config.http_addr()?,
        })
    }
}

/// Bind the TCP listener for the API.
///
/// # Errors
///
/// Returns [`ServerError::Bind`] if the address cannot be bound.
pub async fn bind(config: &ServerConfig) -> Result<TcpListener, ServerError> {
    TcpListener::bind(config.addr)
        .await
        .map_err(|e| ServerError::Bind(format!("bind failed on {}: {e}", config.addr)))
}

/// Serve requests on an already-bound listener until `shutdown` resolves.
///
/// # Errors
///
/// Returns [`ServerError::Serve`] if the server hits a fatal I/O error.
pub async fn serve_on<F>(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener
        .local_addr()
        .map_err(|e| ServerError::Serve(format!("cannot query local address: {e}")))?;
    let router = build_router(state);

    info!(%addr, "http server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ServerError::Serve(format!("serve error: {e}")))?;

    info!(%addr, "http server stopped");
    Ok(())
}

/// Bind and serve until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind or the server
/// encounters a fatal I/O error.
pub async fn serve_until<F>(
    config: &ServerConfig,
    state: Arc<AppState>,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = bind(config).await?;
    serve_on(listener, state, shutdown).await
}

/// Bind and serve for the life of the process.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind or the server
/// encounters a fatal I/O error.
pub async fn start_server(config: &ServerConfig, state: Arc<AppState>) -> Result<(), ServerError> {
    serve_until(config, state, std::future::pending::<()>()).await
}
