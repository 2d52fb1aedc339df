//! Admin authentication and account flows
//!
//! Run: cargo test -p launchpad-server --test admin_auth

mod common;

use common::*;
use http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn health_is_public() {
    let (_tmp, state) = test_state().await;
    let mut app = test_app(&state);

    let response = call(&mut app, get("/health", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn admin_routes_require_a_valid_token() {
    let (_tmp, state) = test_state().await;
    let mut app = test_app(&state);

    // No token
    let response = call(&mut app, get("/api/members", None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["code"], "E3001");

    // Garbage token
    let response = call(&mut app, get("/api/members", Some("not-a-jwt"))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["code"], "E3002");

    // Header without the Bearer scheme
    let request = http::Request::builder()
        .method("GET")
        .uri("/api/members")
        .header(http::header::AUTHORIZATION, "Token abc")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = call(&mut app, request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["code"], "E3002");
}

#[tokio::test]
async fn login_rejects_wrong_credentials_uniformly() {
    let (_tmp, state) = test_state().await;
    let mut app = test_app(&state);

    // Wrong password and unknown email must be indistinguishable
    let response = call(
        &mut app,
        json_request(
            "POST",
            "/api/auth/login",
            &json!({ "email": ADMIN_EMAIL, "password": "wrong-password" }),
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let wrong_password = body_json(response).await;

    let response = call(
        &mut app,
        json_request(
            "POST",
            "/api/auth/login",
            &json!({ "email": "nobody@example.edu", "password": "wrong-password" }),
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let unknown_email = body_json(response).await;

    assert_eq!(wrong_password["code"], "E0006");
    assert_eq!(wrong_password["code"], unknown_email["code"]);
    assert_eq!(wrong_password["message"], unknown_email["message"]);
    assert_eq!(
        wrong_password["message"],
        "Wrong credentials. Please try again."
    );
}

#[tokio::test]
async fn login_returns_profile_and_working_token() {
    let (_tmp, state) = test_state().await;
    let mut app = test_app(&state);

    let response = call(
        &mut app,
        json_request(
            "POST",
            "/api/auth/login",
            &json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }),
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["admin"]["email"], ADMIN_EMAIL);
    assert_eq!(body["admin"]["club"], "sosc");
    let token = body["token"].as_str().unwrap().to_string();

    // The token works against a protected route
    let response = call(&mut app, get("/api/auth/me", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let me = body_json(response).await;
    assert_eq!(me["email"], ADMIN_EMAIL);
    assert_eq!(me["name"], "Launchpad Admin");

    let response = call(
        &mut app,
        json_request("POST", "/api/auth/logout", &json!({}), Some(&token)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn account_name_update_round_trips() {
    let (_tmp, state) = test_state().await;
    let mut app = test_app(&state);
    let token = login(&mut app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let response = call(
        &mut app,
        json_request(
            "PUT",
            "/api/auth/account",
            &json!({ "name": "  Priya N  " }),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["name"], "Priya N");

    let response = call(&mut app, get("/api/auth/me", Some(&token))).await;
    let me = body_json(response).await;
    assert_eq!(me["name"], "Priya N");

    // Blank names are rejected
    let response = call(
        &mut app,
        json_request(
            "PUT",
            "/api/auth/account",
            &json!({ "name": "   " }),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn password_change_requires_current_password() {
    let (_tmp, state) = test_state().await;
    let mut app = test_app(&state);
    let token = login(&mut app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    // Too-short new password fails validation before anything else
    let response = call(
        &mut app,
        json_request(
            "PUT",
            "/api/auth/password",
            &json!({ "current_password": ADMIN_PASSWORD, "new_password": "abc" }),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "E0002");

    // Wrong current password is rejected
    let response = call(
        &mut app,
        json_request(
            "PUT",
            "/api/auth/password",
            &json!({ "current_password": "not-the-password", "new_password": "fresh-password-1" }),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "E0006");

    // Correct current password changes it
    let response = call(
        &mut app,
        json_request(
            "PUT",
            "/api/auth/password",
            &json!({ "current_password": ADMIN_PASSWORD, "new_password": "fresh-password-1" }),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Old credentials stop working, new ones log in
    let response = call(
        &mut app,
        json_request(
            "POST",
            "/api/auth/login",
            &json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }),
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let _token = login(&mut app, ADMIN_EMAIL, "fresh-password-1").await;
}
