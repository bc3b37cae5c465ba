//! HTTP read API for the latch bridge.
//!
//! This crate provides an Axum HTTP server exposing the latest value held
//! by the shared [`StateHolder`](latch_core::StateHolder):
//!
//! - **`GET /api/v1/state/current`** -- value, zero flag, and the last
//!   update / last zero timestamps as RFC3339 strings
//! - **Optional basic auth** over every route when a `user:pass` pair is
//!   configured
//!
//! Handlers only ever read the holder. The server itself is restartable:
//! [`serve_until`] returns on shutdown so a supervisor can rebuild it.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

// Re-export primary types for convenience.
pub use error::{ApiError, ServerError};
pub use router::{CURRENT_STATE_PATH, build_router};
pub use server::{ServerConfig, bind, serve_on, serve_until, start_server};
pub use state::AppState;
