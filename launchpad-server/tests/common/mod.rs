//! Shared helpers for HTTP integration tests
//!
//! Each test gets a throwaway work directory and an embedded database,
//! and calls the fully built app directly as a tower service.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use http::{Request, Response, StatusCode, header};
use launchpad_server::routes;
use launchpad_server::{Config, ServerState};
use serde_json::Value;
use tower::Service;

/// Bootstrap admin credentials seeded on first boot (development defaults)
pub const ADMIN_EMAIL: &str = "admin@sosc.club";
pub const ADMIN_PASSWORD: &str = "launchpad-dev-password";

/// Build a server state backed by a temporary database.
///
/// The TempDir must stay alive for as long as the state is used.
pub async fn test_state() -> (tempfile::TempDir, ServerState) {
    let tmp = tempfile::tempdir().unwrap();
    let config = Config::with_overrides(tmp.path().to_string_lossy(), 0);
    let state = ServerState::initialize(&config).await;
    (tmp, state)
}

/// Build the full application (all routes and middleware) for a state
pub fn test_app(state: &ServerState) -> Router {
    routes::build_app(state).with_state(state.clone())
}

/// Call the app with a request, panicking on transport errors
pub async fn call(app: &mut Router, request: Request<Body>) -> Response<Body> {
    app.call(request).await.unwrap()
}

/// GET request, optionally authenticated
pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

/// Request with a JSON body, optionally authenticated
pub fn json_request(method: &str, uri: &str, body: &Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// DELETE request, optionally authenticated
pub fn delete(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("DELETE").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

/// Read a response body as JSON
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Log in over HTTP and return the JWT
pub async fn login(app: &mut Router, email: &str, password: &str) -> String {
    let request = json_request(
        "POST",
        "/api/auth/login",
        &serde_json::json!({ "email": email, "password": password }),
        None,
    );
    let response = call(app, request).await;
    assert_eq!(response.status(), StatusCode::OK, "login should succeed");
    let body = body_json(response).await;
    body["token"].as_str().unwrap().to_string()
}
