//! Kiosk check-in/check-out flows over HTTP
//!
//! Run: cargo test -p launchpad-server --test attendance_flow

mod common;

use common::*;
use http::StatusCode;
use launchpad_server::db::models::{AttendanceKind, Club, MemberCreate};
use launchpad_server::db::repository::{AttendanceRepository, MemberRepository, SessionRepository};
use launchpad_server::utils::time::MILLIS_PER_MINUTE;
use launchpad_server::{Config, ServerState};
use serde_json::json;

async fn seed_member(state: &ServerState, usn: &str, name: &str) {
    MemberRepository::new(state.db.clone())
        .create(
            Club::Sosc,
            MemberCreate {
                usn: usn.to_string(),
                name: name.to_string(),
                email: format!("{usn}@example.edu"),
                phone: "9876543210".to_string(),
            },
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn member_check_in_opens_session_and_checks_out() {
    let (_tmp, state) = test_state().await;
    let mut app = test_app(&state);
    seed_member(&state, "4SO21CS001", "Asha Rao").await;

    // Padded USN is trimmed before lookup
    let response = call(
        &mut app,
        json_request("POST", "/api/checkin", &json!({ "usn": " 4SO21CS001 " }), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["member_found"], json!(true));
    let session = body["session"].clone();
    assert_eq!(session["status"], "active");
    assert_eq!(session["kind"], "member");
    assert_eq!(session["display_name"], "Asha Rao");
    assert_eq!(session["reminder_enabled"], json!(false));
    let session_id = session["id"].as_str().unwrap().to_string();
    assert!(session_id.starts_with("session:"));

    // Status page round-trip returns the same session
    let response = call(
        &mut app,
        get(&format!("/api/checkin/session/{session_id}"), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let status_body = body_json(response).await;
    assert_eq!(status_body["id"].as_str().unwrap(), session_id);
    assert_eq!(status_body["user_id"], "4SO21CS001");
    assert_eq!(status_body["check_in"], session["check_in"]);

    // Check out
    let response = call(
        &mut app,
        json_request(
            "POST",
            "/api/checkin/checkout",
            &json!({ "session_id": session_id }),
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let out = body_json(response).await;
    assert_eq!(out["session_id"].as_str().unwrap(), session_id);
    assert!(out["duration_minutes"].as_i64().unwrap() >= 0);

    // Session reads back closed
    let response = call(
        &mut app,
        get(&format!("/api/checkin/session/{session_id}"), None),
    )
    .await;
    let closed = body_json(response).await;
    assert_eq!(closed["status"], "closed");
}

#[tokio::test]
async fn check_in_rejects_blank_usn() {
    let (_tmp, state) = test_state().await;
    let mut app = test_app(&state);

    let response = call(
        &mut app,
        json_request("POST", "/api/checkin", &json!({ "usn": "   " }), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "E0002");
}

#[tokio::test]
async fn unknown_usn_redirects_to_guest_registration() {
    let (_tmp, state) = test_state().await;
    let mut app = test_app(&state);

    // No member record, nothing is written
    let response = call(
        &mut app,
        json_request("POST", "/api/checkin", &json!({ "usn": "999" }), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["member_found"], json!(false));
    assert!(body.get("session").is_none());

    // Guest registration opens a guest session instead
    let response = call(
        &mut app,
        json_request(
            "POST",
            "/api/checkin/guest",
            &json!({
                "usn": "999",
                "full_name": "Guest Person",
                "phone_number": "9000000000",
                "purpose": "Workshop"
            }),
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let session = &body["session"];
    assert_eq!(session["kind"], "guest");
    assert_eq!(session["status"], "active");
    assert_eq!(session["display_name"], "Guest Person");
    let guest_key = session["user_id"].as_str().unwrap();
    assert!(guest_key.starts_with("guest:"));

    // An open guest attendance record backs the session
    let open = AttendanceRepository::new(state.db.clone())
        .find_open_by_user(guest_key)
        .await
        .unwrap()
        .expect("open guest attendance record");
    assert_eq!(open.kind, AttendanceKind::Guest);
    assert!(open.check_out.is_none());
}

#[tokio::test]
async fn guest_registration_requires_all_fields() {
    let (_tmp, state) = test_state().await;
    let mut app = test_app(&state);

    let response = call(
        &mut app,
        json_request(
            "POST",
            "/api/checkin/guest",
            &json!({
                "usn": "999",
                "full_name": "Guest Person",
                "phone_number": "9000000000",
                "purpose": ""
            }),
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "E0002");
}

#[tokio::test]
async fn duplicate_check_in_is_rejected() {
    let (_tmp, state) = test_state().await;
    let mut app = test_app(&state);
    seed_member(&state, "4SO21CS002", "Bran Kumar").await;

    let response = call(
        &mut app,
        json_request("POST", "/api/checkin", &json!({ "usn": "4SO21CS002" }), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Second check-in while the first is still open
    let response = call(
        &mut app,
        json_request("POST", "/api/checkin", &json!({ "usn": "4SO21CS002" }), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["code"], "E0004");
}

#[tokio::test]
async fn double_checkout_is_rejected_and_timestamp_unchanged() {
    let (_tmp, state) = test_state().await;
    let mut app = test_app(&state);
    seed_member(&state, "4SO21CS003", "Mira Shetty").await;

    let response = call(
        &mut app,
        json_request("POST", "/api/checkin", &json!({ "usn": "4SO21CS003" }), None),
    )
    .await;
    let body = body_json(response).await;
    let session_id = body["session"]["id"].as_str().unwrap().to_string();

    let response = call(
        &mut app,
        json_request(
            "POST",
            "/api/checkin/checkout",
            &json!({ "session_id": session_id }),
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let session = SessionRepository::new(state.db.clone())
        .find_by_id(&session_id)
        .await
        .unwrap()
        .unwrap();
    let record = AttendanceRepository::new(state.db.clone())
        .find_by_id(&session.attendance_id)
        .await
        .unwrap()
        .unwrap();
    let first_checkout = record.check_out.expect("record closed by checkout");

    // Replay of the same checkout must not move the timestamp
    let response = call(
        &mut app,
        json_request(
            "POST",
            "/api/checkin/checkout",
            &json!({ "session_id": session_id }),
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["code"], "E0004");

    let record = AttendanceRepository::new(state.db.clone())
        .find_by_id(&session.attendance_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.check_out, Some(first_checkout));
}

#[tokio::test]
async fn session_status_unknown_id_is_not_found() {
    let (_tmp, state) = test_state().await;
    let mut app = test_app(&state);

    let response = call(
        &mut app,
        get("/api/checkin/session/session:doesnotexist", None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["code"], "E0003");
}

#[tokio::test]
async fn checkout_unknown_session_is_not_found() {
    let (_tmp, state) = test_state().await;
    let mut app = test_app(&state);

    let response = call(
        &mut app,
        json_request(
            "POST",
            "/api/checkin/checkout",
            &json!({ "session_id": "session:doesnotexist" }),
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reminder_toggle_arms_and_disarms() {
    let (_tmp, state) = test_state().await;
    let mut app = test_app(&state);
    seed_member(&state, "4SO21CS004", "Dev Nayak").await;

    let response = call(
        &mut app,
        json_request("POST", "/api/checkin", &json!({ "usn": "4SO21CS004" }), None),
    )
    .await;
    let body = body_json(response).await;
    let session_id = body["session"]["id"].as_str().unwrap().to_string();
    let check_in = body["session"]["check_in"].as_i64().unwrap();

    // Enable: first deadline is one interval after check-in
    let response = call(
        &mut app,
        json_request(
            "POST",
            "/api/checkin/reminder",
            &json!({ "session_id": session_id, "enabled": true }),
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["enabled"], json!(true));
    let interval = state.config.checkout_reminder_minutes * MILLIS_PER_MINUTE;
    assert_eq!(body["next_reminder_at"].as_i64().unwrap(), check_in + interval);
    assert!(state.reminders.is_armed(&session_id));

    // The flag is persisted on the session
    let response = call(
        &mut app,
        get(&format!("/api/checkin/session/{session_id}"), None),
    )
    .await;
    let status_body = body_json(response).await;
    assert_eq!(status_body["reminder_enabled"], json!(true));

    // Disable: entry is dropped from the registry
    let response = call(
        &mut app,
        json_request(
            "POST",
            "/api/checkin/reminder",
            &json!({ "session_id": session_id, "enabled": false }),
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["enabled"], json!(false));
    assert!(body.get("next_reminder_at").is_none());
    assert!(!state.reminders.is_armed(&session_id));
}

#[tokio::test]
async fn reminder_enable_respects_global_switch() {
    let tmp = tempfile::tempdir().unwrap();
    let mut config = Config::with_overrides(tmp.path().to_string_lossy(), 0);
    config.enable_checkout_reminders = false;
    let state = ServerState::initialize(&config).await;
    let mut app = test_app(&state);
    seed_member(&state, "4SO21CS005", "Ela D'Souza").await;

    let response = call(
        &mut app,
        json_request("POST", "/api/checkin", &json!({ "usn": "4SO21CS005" }), None),
    )
    .await;
    let body = body_json(response).await;
    let session_id = body["session"]["id"].as_str().unwrap().to_string();

    let response = call(
        &mut app,
        json_request(
            "POST",
            "/api/checkin/reminder",
            &json!({ "session_id": session_id, "enabled": true }),
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["code"], "E0005");
    assert!(!state.reminders.is_armed(&session_id));
}
