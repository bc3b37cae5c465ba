//! REST endpoint handlers.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/api/v1/state/current` | Latest value with its timestamps |
//!
//! Every reply uses the same envelope:
//!
//! ```json
//! { "code": 1, "message": "...", "data": { ... } }
//! ```

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use latch_core::StateSnapshot;
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// `code` value of a successful reply.
pub const CODE_OK: i32 = 1;

/// JSON envelope shared by all replies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// `1` on success, `0` on error.
    pub code: i32,
    /// Human-readable status; may be empty.
    pub message: String,
    /// Endpoint payload, `null` on error.
    pub data: T,
}

/// Return the current retained value.
///
/// Always answers 200 with the best state currently held; a bridge that
/// has not received anything yet reports the zero value.
pub async fn current_state(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<StateSnapshot>> {
    let snapshot = state.holder.snapshot().await;
    Json(ApiResponse {
        code: CODE_OK,
        message: String::from("state fetched successfully"),
        data: snapshot,
    })
}
