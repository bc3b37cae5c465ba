//! Integration tests for the HTTP API.
//!
//! Most tests drive the Axum `Router` directly via `tower::ServiceExt`
//! without starting a TCP server. The last ones bind a real listener to
//! exercise the server lifecycle.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::DateTime;
use latch_core::{Credentials, StateHolder};
use latch_http::router::{CURRENT_STATE_PATH, build_router};
use latch_http::server::{ServerConfig, bind, serve_on};
use latch_http::state::AppState;
use serde_json::Value;
use tower::ServiceExt;

fn make_state(zero: &str) -> Arc<AppState> {
    Arc::new(AppState::new(Arc::new(StateHolder::new(zero))))
}

fn make_guarded_state(zero: &str) -> Arc<AppState> {
    let creds = Credentials::parse("admin:secret");
    Arc::new(AppState::with_credentials(
        Arc::new(StateHolder::new(zero)),
        creds.as_ref(),
    ))
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(path: &str) -> Request<Body> {
    Request::get(path).body(Body::empty()).unwrap()
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_initial_state_reports_zero() {
    let router = build_router(make_state("0"));

    let response = router.oneshot(get(CURRENT_STATE_PATH)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["code"], 1);
    assert!(json["message"].is_string());
    assert_eq!(json["data"]["value"], "0");
    assert_eq!(json["data"]["is_zero"], true);
    assert_eq!(json["data"]["last_update"], json["data"]["last_zero"]);
}

#[tokio::test]
async fn test_written_value_is_served() {
    let state = make_state("0");
    state.holder.write(b"42").await;
    let router = build_router(state);

    let response = router.oneshot(get(CURRENT_STATE_PATH)).await.unwrap();

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["data"]["value"], "42");
    assert_eq!(json["data"]["is_zero"], false);
}

#[tokio::test]
async fn test_timestamps_are_rfc3339() {
    let router = build_router(make_state(""));

    let response = router.oneshot(get(CURRENT_STATE_PATH)).await.unwrap();

    let json = body_to_json(response.into_body()).await;
    for field in ["last_update", "last_zero"] {
        let stamp = json["data"][field].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(stamp).is_ok(), "{field}: {stamp}");
    }
}

#[tokio::test]
async fn test_reads_do_not_mutate_state() {
    let state = make_state("0");
    state.holder.write(b"9").await;
    let before = state.holder.snapshot().await;
    let router = build_router(Arc::clone(&state));

    for _ in 0..3 {
        let response = router.clone().oneshot(get(CURRENT_STATE_PATH)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(state.holder.snapshot().await, before);
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let router = build_router(make_state("0"));

    let response = router.oneshot(get("/api/v1/wight/current")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_auth_rejects_missing_credentials() {
    let router = build_router(make_guarded_state("0"));

    let response = router.oneshot(get(CURRENT_STATE_PATH)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["code"], 0);
    assert!(json["data"].is_null());
}

#[tokio::test]
async fn test_auth_rejects_wrong_password() {
    let router = build_router(make_guarded_state("0"));
    let request = Request::get(CURRENT_STATE_PATH)
        .header(
            header::AUTHORIZATION,
            format!("Basic {}", STANDARD.encode("admin:wrong")),
        )
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_accepts_configured_credentials() {
    let router = build_router(make_guarded_state("0"));
    let request = Request::get(CURRENT_STATE_PATH)
        .header(
            header::AUTHORIZATION,
            format!("Basic {}", STANDARD.encode("admin:secret")),
        )
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["data"]["value"], "0");
}

#[tokio::test]
async fn test_malformed_credentials_disable_auth() {
    let creds = Credentials::parse("adminonly");
    let state = Arc::new(AppState::with_credentials(
        Arc::new(StateHolder::new("0")),
        creds.as_ref(),
    ));
    let router = build_router(state);

    let response = router.oneshot(get(CURRENT_STATE_PATH)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_live_server_serves_and_shuts_down() {
    let state = make_state("0");
    state.holder.write(b"live").await;
    let listener = bind(&ServerConfig {
        addr: "127.0.0.1:0".parse().unwrap(),
    })
    .await
    .unwrap();
    let addr = listener.local_addr().unwrap();

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(serve_on(listener, state, async move {
        let _ = stop_rx.await;
    }));

    let url = format!("http://{addr}{CURRENT_STATE_PATH}");
    let json: Value = reqwest::get(&url).await.unwrap().json().await.unwrap();
    assert_eq!(json["data"]["value"], "live");

    stop_tx.send(()).unwrap();
    let result = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .unwrap()
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_bind_conflict_is_a_bind_error() {
    let occupied = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let config = ServerConfig {
        addr: occupied.local_addr().unwrap(),
    };

    let err = bind(&config).await.unwrap_err();

    assert!(matches!(err, latch_http::ServerError::Bind(_)));
}
