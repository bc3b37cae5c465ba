//! Shared application state for the HTTP API.

use std::sync::Arc;

use latch_core::{Credentials, StateHolder};

use crate::auth::BasicAuth;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor. The
/// holder is read-only from this side; the UDP loop is its only writer.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The latest-value holder fed by the UDP loop.
    pub holder: Arc<StateHolder>,
    /// Basic auth guard, if configured.
    pub auth: Option<BasicAuth>,
}

impl AppState {
    /// Create state with authentication disabled.
    pub const fn new(holder: Arc<StateHolder>) -> Self {
        Self { holder, auth: None }
    }

    /// Create state guarded by the given credentials, or unguarded when
    /// `credentials` is `None`.
    pub fn with_credentials(holder: Arc<StateHolder>, credentials: Option<&Credentials>) -> Self {
        Self {
            holder,
            auth: credentials.map(BasicAuth::new),
        }
    }
}
