//! Single-account HTTP basic authentication.
//!
//! The expected `Authorization` header is computed once at startup and
//! compared against each request. When no credentials are configured the
//! middleware passes every request through.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use latch_core::Credentials;
use tracing::warn;

use crate::error::ApiError;
use crate::state::AppState;

/// Precomputed basic-auth header for one account.
#[derive(Clone)]
pub struct BasicAuth {
    user: String,
    expected: String,
}

impl BasicAuth {
    /// Build the guard for `credentials`.
    pub fn new(credentials: &Credentials) -> Self {
        let token = STANDARD.encode(format!("{}:{}", credentials.user, credentials.pass));
        Self {
            user: credentials.user.clone(),
            expected: format!("Basic {token}"),
        }
    }

    /// Whether an `Authorization` header value grants access.
    pub fn accepts(&self, authorization: Option<&str>) -> bool {
        authorization.is_some_and(|value| constant_time_eq(value.as_bytes(), self.expected.as_bytes()))
    }
}

impl std::fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuth")
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0_u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Axum middleware enforcing [`AppState::auth`] when it is set.
pub async fn require_basic_auth(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(auth) = &state.auth else {
        return Ok(next.run(request).await);
    };

    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    if auth.accepts(authorization) {
        Ok(next.run(request).await)
    } else {
        warn!(uri = %request.uri(), "rejected request with missing or wrong credentials");
        Err(ApiError::Unauthorized)
    }
}
