//! Error types for the HTTP API.
//!
//! [`ApiError`] covers request-level failures and converts into an Axum
//! response carrying the same JSON envelope as successful replies.
//! [`ServerError`] covers the server lifecycle and is always recoverable
//! from the supervisor's point of view.

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use latch_core::Escalation;

use crate::handlers::ApiResponse;

/// Errors returned to HTTP clients.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Basic auth is enabled and the request did not carry the expected
    /// credentials.
    #[error("unauthorized")]
    Unauthorized,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
        };

        let body = ApiResponse {
            code: 0,
            message: self.to_string(),
            data: serde_json::Value::Null,
        };

        let mut response = (status, axum::Json(body)).into_response();
        if matches!(self, Self::Unauthorized) {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static(r#"Basic realm="latch""#),
            );
        }
        response
    }
}

/// Errors that can occur when starting or running the HTTP server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind to the network address.
    #[error("bind error: {0}")]
    Bind(String),

    /// The server encountered a fatal error while serving.
    #[error("serve error: {0}")]
    Serve(String),
}

impl Escalation for ServerError {
    fn is_fatal(&self) -> bool {
        false
    }
}
