//! Axum router construction for the HTTP API.
//!
//! Assembles the routes into a single [`Router`] with request tracing,
//! permissive CORS for browser dashboards that poll the endpoint, and the
//! optional basic-auth guard.

use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth;
use crate::handlers;
use crate::state::AppState;

/// Path of the current-state endpoint.
pub const CURRENT_STATE_PATH: &str = "/api/v1/state/current";

/// Build the complete Axum router.
///
/// The router includes:
/// - `GET /api/v1/state/current` -- latest value and timestamps
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(CURRENT_STATE_PATH, get(handlers::current_state))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            auth::require_basic_auth,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
