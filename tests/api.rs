//! End-to-end API tests
//!
//! Each test boots the full router over an in-memory database and drives
//! it through HTTP, the same way a browser client would.

use axum_test::TestServer;
use serde_json::{json, Value};

use atelier::api::{build_router, AppState};
use atelier::db::{create_test_pool, migrations};

async fn test_server() -> TestServer {
    let pool = create_test_pool().await.expect("Failed to create test pool");
    migrations::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    let state = AppState::new(pool, 7);
    let app = build_router(state, "http://localhost:3000");
    TestServer::new(app).expect("Failed to start test server")
}

/// Register a user and log them in, returning the bearer token.
///
/// The first account registered on a fresh server is the admin.
async fn register_and_login(server: &TestServer, username: &str) -> String {
    let email = format!("{}@example.com", username);
    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "username": username,
            "email": email,
            "password": "password123",
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);

    let response = server
        .post("/api/auth/login")
        .json(&json!({
            "email": email,
            "password": "password123",
        }))
        .await;
    response.assert_status_ok();
    response.json::<Value>()["token"]
        .as_str()
        .expect("Login response missing token")
        .to_string()
}

async fn submit_artwork(server: &TestServer, token: &str, title: &str) -> Value {
    let response = server
        .post("/api/artworks")
        .authorization_bearer(token)
        .json(&json!({
            "title": title,
            "description": "A charcoal study",
            "image": "artworks/study.png",
            "category": "sketch",
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<Value>()
}

#[tokio::test]
async fn test_register_login_me_roundtrip() {
    let server = test_server().await;
    let token = register_and_login(&server, "curator").await;

    let response = server.get("/api/auth/me").authorization_bearer(&token).await;
    response.assert_status_ok();
    let me = response.json::<Value>();
    assert_eq!(me["username"], "curator");
    // First account bootstraps as admin
    assert_eq!(me["role"], "admin");
    assert!(me.get("password_hash").is_none());
}

#[tokio::test]
async fn test_second_account_is_visitor() {
    let server = test_server().await;
    register_and_login(&server, "curator").await;
    let token = register_and_login(&server, "artist").await;

    let response = server.get("/api/auth/me").authorization_bearer(&token).await;
    assert_eq!(response.json::<Value>()["role"], "visitor");
}

#[tokio::test]
async fn test_requests_without_token_are_rejected() {
    let server = test_server().await;
    let response = server.get("/api/artworks").await;
    response.assert_status_unauthorized();

    let response = server
        .get("/api/artworks")
        .authorization_bearer("not-a-real-token")
        .await;
    response.assert_status_unauthorized();
}

#[tokio::test]
async fn test_submission_assigns_artist_and_pending() {
    let server = test_server().await;
    register_and_login(&server, "curator").await;
    let artist = register_and_login(&server, "artist").await;

    let artwork = submit_artwork(&server, &artist, "Dusk").await;
    assert_eq!(artwork["approval_status"], "pending");

    let me = server
        .get("/api/auth/me")
        .authorization_bearer(&artist)
        .await
        .json::<Value>();
    assert_eq!(artwork["artist_id"], me["id"]);
}

#[tokio::test]
async fn test_reject_with_feedback_notifies_artist() {
    let server = test_server().await;
    let admin = register_and_login(&server, "curator").await;
    let artist = register_and_login(&server, "artist").await;
    let artwork = submit_artwork(&server, &artist, "Blurry").await;

    let response = server
        .patch(&format!("/api/artworks/{}/reject", artwork["id"]))
        .authorization_bearer(&admin)
        .json(&json!({ "feedback": "too blurry" }))
        .await;
    response.assert_status_ok();
    let rejected = response.json::<Value>();
    assert_eq!(rejected["approval_status"], "rejected");
    assert_eq!(rejected["feedback"], "too blurry");

    let notifications = server
        .get("/api/notifications")
        .authorization_bearer(&artist)
        .await
        .json::<Value>();
    assert_eq!(notifications["total"], 1);
    let message = notifications["items"][0]["message"].as_str().unwrap();
    assert!(message.contains("too blurry"));
}

#[tokio::test]
async fn test_blank_feedback_rejection_is_refused() {
    let server = test_server().await;
    let admin = register_and_login(&server, "curator").await;
    let artist = register_and_login(&server, "artist").await;
    let artwork = submit_artwork(&server, &artist, "Dusk").await;

    let response = server
        .patch(&format!("/api/artworks/{}/reject", artwork["id"]))
        .authorization_bearer(&admin)
        .json(&json!({ "feedback": "   " }))
        .await;
    response.assert_status_bad_request();

    // The artwork is untouched and the artist heard nothing
    let unchanged = server
        .get(&format!("/api/artworks/{}", artwork["id"]))
        .authorization_bearer(&admin)
        .await
        .json::<Value>();
    assert_eq!(unchanged["approval_status"], "pending");

    let notifications = server
        .get("/api/notifications")
        .authorization_bearer(&artist)
        .await
        .json::<Value>();
    assert_eq!(notifications["total"], 0);
}

#[tokio::test]
async fn test_non_admin_cannot_moderate() {
    let server = test_server().await;
    register_and_login(&server, "curator").await;
    let artist = register_and_login(&server, "artist").await;
    let artwork = submit_artwork(&server, &artist, "Dusk").await;

    let response = server
        .patch(&format!("/api/artworks/{}/approve", artwork["id"]))
        .authorization_bearer(&artist)
        .await;
    response.assert_status_forbidden();
}

#[tokio::test]
async fn test_pending_filter_lists_only_pending() {
    let server = test_server().await;
    let admin = register_and_login(&server, "curator").await;
    let artist = register_and_login(&server, "artist").await;

    let first = submit_artwork(&server, &artist, "First").await;
    submit_artwork(&server, &artist, "Second").await;

    server
        .patch(&format!("/api/artworks/{}/approve", first["id"]))
        .authorization_bearer(&admin)
        .await
        .assert_status_ok();

    let page = server
        .get("/api/artworks")
        .add_query_param("approval_status", "pending")
        .authorization_bearer(&admin)
        .await
        .json::<Value>();
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["title"], "Second");
}

#[tokio::test]
async fn test_event_update_notifies_all_attendees() {
    let server = test_server().await;
    let admin = register_and_login(&server, "curator").await;
    let a = register_and_login(&server, "attendee_a").await;
    let b = register_and_login(&server, "attendee_b").await;

    let a_id = server
        .get("/api/auth/me")
        .authorization_bearer(&a)
        .await
        .json::<Value>()["id"]
        .clone();
    let b_id = server
        .get("/api/auth/me")
        .authorization_bearer(&b)
        .await
        .json::<Value>()["id"]
        .clone();

    let event = server
        .post("/api/events")
        .authorization_bearer(&admin)
        .json(&json!({
            "title": "Opening",
            "description": "Opening night",
            "date": "2026-09-01",
            "location": "Main Hall",
            "attendees": [a_id, b_id],
        }))
        .await
        .json::<Value>();

    let response = server
        .put(&format!("/api/events/{}", event["id"]))
        .authorization_bearer(&admin)
        .json(&json!({ "location": "East Wing" }))
        .await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["notifications"]["delivered"], 2);
    assert_eq!(body["notifications"]["failed"], 0);

    for token in [&a, &b] {
        let notifications = server
            .get("/api/notifications")
            .add_query_param("unread", "true")
            .authorization_bearer(token)
            .await
            .json::<Value>();
        assert_eq!(notifications["total"], 1);
        assert_eq!(
            notifications["items"][0]["message"],
            "The event 'Opening' has been updated."
        );
    }
}

#[tokio::test]
async fn test_non_owner_cannot_update_project() {
    let server = test_server().await;
    register_and_login(&server, "curator").await;
    let creator = register_and_login(&server, "creator").await;
    let other = register_and_login(&server, "other").await;

    let project = server
        .post("/api/projects")
        .authorization_bearer(&creator)
        .json(&json!({
            "title": "Mural",
            "description": "Community mural",
        }))
        .await
        .json::<Value>();

    let response = server
        .put(&format!("/api/projects/{}", project["id"]))
        .authorization_bearer(&other)
        .json(&json!({ "description": "hijacked" }))
        .await;
    response.assert_status_forbidden();
}

#[tokio::test]
async fn test_project_member_replacement_sends_invites() {
    let server = test_server().await;
    register_and_login(&server, "curator").await;
    let creator = register_and_login(&server, "creator").await;
    let member = register_and_login(&server, "member").await;

    let member_id = server
        .get("/api/auth/me")
        .authorization_bearer(&member)
        .await
        .json::<Value>()["id"]
        .clone();

    let project = server
        .post("/api/projects")
        .authorization_bearer(&creator)
        .json(&json!({
            "title": "Mural",
            "description": "Community mural",
        }))
        .await
        .json::<Value>();

    let response = server
        .put(&format!("/api/projects/{}", project["id"]))
        .authorization_bearer(&creator)
        .json(&json!({ "members": [member_id] }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["notifications"]["delivered"], 1);

    let notifications = server
        .get("/api/notifications")
        .authorization_bearer(&member)
        .await
        .json::<Value>();
    assert_eq!(
        notifications["items"][0]["message"],
        "You have been added to the project 'Mural'."
    );
}

#[tokio::test]
async fn test_complete_project_is_creator_only() {
    let server = test_server().await;
    let admin = register_and_login(&server, "curator").await;
    let creator = register_and_login(&server, "creator").await;

    let project = server
        .post("/api/projects")
        .authorization_bearer(&creator)
        .json(&json!({
            "title": "Mural",
            "description": "Community mural",
        }))
        .await
        .json::<Value>();

    let response = server
        .post(&format!("/api/projects/{}/complete", project["id"]))
        .authorization_bearer(&admin)
        .await;
    response.assert_status_forbidden();

    let response = server
        .post(&format!("/api/projects/{}/complete", project["id"]))
        .authorization_bearer(&creator)
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["is_completed"], true);
}

#[tokio::test]
async fn test_mark_notification_read() {
    let server = test_server().await;
    let admin = register_and_login(&server, "curator").await;
    let artist = register_and_login(&server, "artist").await;
    let artwork = submit_artwork(&server, &artist, "Dusk").await;

    server
        .patch(&format!("/api/artworks/{}/approve", artwork["id"]))
        .authorization_bearer(&admin)
        .await
        .assert_status_ok();

    let notifications = server
        .get("/api/notifications")
        .authorization_bearer(&artist)
        .await
        .json::<Value>();
    let id = &notifications["items"][0]["id"];

    let response = server
        .patch(&format!("/api/notifications/{}/read", id))
        .authorization_bearer(&artist)
        .await;
    response.assert_status_ok();

    let count = server
        .get("/api/notifications/unread-count")
        .authorization_bearer(&artist)
        .await
        .json::<Value>();
    assert_eq!(count["unread"], 0);
}

#[tokio::test]
async fn test_admin_routes_require_admin_role() {
    let server = test_server().await;
    let admin = register_and_login(&server, "curator").await;
    let visitor = register_and_login(&server, "visitor").await;

    let response = server.get("/api/users").authorization_bearer(&visitor).await;
    response.assert_status_forbidden();
    let response = server
        .get("/api/activity-logs")
        .authorization_bearer(&visitor)
        .await;
    response.assert_status_forbidden();

    let response = server.get("/api/users").authorization_bearer(&admin).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["total"], 2);
}

#[tokio::test]
async fn test_role_promotion_flow() {
    let server = test_server().await;
    let admin = register_and_login(&server, "curator").await;
    let visitor = register_and_login(&server, "newcomer").await;

    let visitor_id = server
        .get("/api/auth/me")
        .authorization_bearer(&visitor)
        .await
        .json::<Value>()["id"]
        .clone();

    let response = server
        .patch(&format!("/api/users/{}/role", visitor_id))
        .authorization_bearer(&admin)
        .json(&json!({ "role": "member" }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["role"], "member");

    let stats = server
        .get("/api/users/member-stats")
        .authorization_bearer(&admin)
        .await
        .json::<Value>();
    assert_eq!(stats["total_users"], 2);
    assert_eq!(stats["members"], 1);
}

#[tokio::test]
async fn test_activity_logs_record_logins() {
    let server = test_server().await;
    let admin = register_and_login(&server, "curator").await;

    let logs = server
        .get("/api/activity-logs")
        .authorization_bearer(&admin)
        .await
        .json::<Value>();
    assert!(logs["total"].as_i64().unwrap() >= 1);
    assert_eq!(logs["items"][0]["action"], "login");
}

#[tokio::test]
async fn test_preferences_roundtrip() {
    let server = test_server().await;
    let token = register_and_login(&server, "curator").await;

    let response = server
        .put("/api/preferences")
        .authorization_bearer(&token)
        .json(&json!({ "artwork": true, "events": false, "projects": true }))
        .await;
    response.assert_status_ok();

    let preferences = server
        .get("/api/preferences")
        .authorization_bearer(&token)
        .await
        .json::<Value>();
    assert_eq!(preferences["events"], false);
}

#[tokio::test]
async fn test_logout_invalidates_token() {
    let server = test_server().await;
    let token = register_and_login(&server, "curator").await;

    server
        .post("/api/auth/logout")
        .authorization_bearer(&token)
        .await
        .assert_status_ok();

    let response = server.get("/api/auth/me").authorization_bearer(&token).await;
    response.assert_status_unauthorized();
}
