//! Integration tests for login, refresh, logout and session listing.

mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

const PASSWORD: &str = "Str0ng!pass";

async fn registered_app() -> (TestApp, serde_json::Value) {
    let app = TestApp::spawn();
    let body = app.register_user("alice1", "a@x.com", PASSWORD).await;
    (app, body)
}

#[tokio::test]
async fn login_returns_tokens_and_user() {
    let (app, _) = registered_app().await;

    let (status, body) = app
        .post("/auth/login", json!({ "email": "a@x.com", "password": PASSWORD }))
        .await;

    assert_eq!(status, StatusCode::OK, "body: {}", body);
    assert!(!body["accessToken"].as_str().unwrap().is_empty());
    assert!(!body["refreshToken"].as_str().unwrap().is_empty());
    assert_eq!(body["user"]["username"], "alice1");
}

#[tokio::test]
async fn login_email_is_normalized() {
    let (app, _) = registered_app().await;

    let (status, _) = app
        .post(
            "/auth/login",
            json!({ "email": "  A@X.COM ", "password": PASSWORD }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn login_rejects_wrong_password() {
    let (app, _) = registered_app().await;

    let (status, body) = app
        .post(
            "/auth/login",
            json!({ "email": "a@x.com", "password": "Wr0ng!pass" }),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid email or password");
}

#[tokio::test]
async fn login_rejects_unknown_email_with_same_error() {
    let (app, _) = registered_app().await;

    let (status, body) = app
        .post(
            "/auth/login",
            json!({ "email": "nobody@x.com", "password": PASSWORD }),
        )
        .await;

    // Indistinguishable from a wrong password
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid email or password");
}

#[tokio::test]
async fn refresh_returns_new_access_token_same_refresh_token() {
    let (app, registered) = registered_app().await;
    let refresh_token = registered["refreshToken"].as_str().unwrap();

    let (status, body) = app
        .post("/auth/refresh", json!({ "refreshToken": refresh_token }))
        .await;

    assert_eq!(status, StatusCode::OK, "body: {}", body);
    assert!(!body["accessToken"].as_str().unwrap().is_empty());
    assert_eq!(body["refreshToken"], refresh_token);
    assert_eq!(body["expiresIn"], 3600);

    let claims = app
        .state
        .jwt
        .validate_access_token(body["accessToken"].as_str().unwrap())
        .unwrap();
    assert_eq!(claims.username, "alice1");
}

#[tokio::test]
async fn refresh_rejects_garbage_token() {
    let (app, _) = registered_app().await;

    let (status, _) = app
        .post("/auth/refresh", json!({ "refreshToken": "not-a-jwt" }))
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn refresh_bumps_last_used() {
    let (app, registered) = registered_app().await;
    let refresh_token = registered["refreshToken"].as_str().unwrap();
    let user_id = registered["user"]["userId"].as_str().unwrap();

    let before = app.state.db.list_sessions(user_id).await.unwrap()[0].last_used_at;

    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    let (status, _) = app
        .post("/auth/refresh", json!({ "refreshToken": refresh_token }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let after = app.state.db.list_sessions(user_id).await.unwrap()[0].last_used_at;
    assert!(after > before);
}

#[tokio::test]
async fn logout_revokes_session_and_blocks_refresh() {
    let (app, registered) = registered_app().await;
    let access_token = registered["accessToken"].as_str().unwrap();
    let refresh_token = registered["refreshToken"].as_str().unwrap();

    let (status, body) = app
        .post_auth(
            "/auth/logout",
            json!({ "refreshToken": refresh_token }),
            access_token,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "body: {}", body);

    // The revoked session can no longer mint access tokens
    let (status, body) = app
        .post("/auth/refresh", json!({ "refreshToken": refresh_token }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Session is no longer active");
}

#[tokio::test]
async fn logout_requires_bearer_token() {
    let (app, registered) = registered_app().await;
    let refresh_token = registered["refreshToken"].as_str().unwrap();

    let (status, _) = app
        .post("/auth/logout", json!({ "refreshToken": refresh_token }))
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_rejects_other_users_refresh_token() {
    let (app, alice) = registered_app().await;
    let bob = app.register_user("bob7", "b@x.com", PASSWORD).await;

    let (status, _) = app
        .post_auth(
            "/auth/logout",
            json!({ "refreshToken": alice["refreshToken"] }),
            bob["accessToken"].as_str().unwrap(),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn sessions_lists_each_login() {
    let (app, registered) = registered_app().await;

    // Second device
    let (status, _) = app
        .post("/auth/login", json!({ "email": "a@x.com", "password": PASSWORD }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let access_token = registered["accessToken"].as_str().unwrap();
    let (status, body) = app.get_auth("/auth/sessions", access_token).await;

    assert_eq!(status, StatusCode::OK, "body: {}", body);
    let sessions = body["sessions"].as_array().unwrap();
    assert_eq!(sessions.len(), 2);
    for session in sessions {
        assert_eq!(session["platform"], "Linux");
        assert_eq!(session["active"], true);
        assert!(session.get("refreshTokenHash").is_none());
        assert!(session.get("refresh_token_hash").is_none());
    }
}

#[tokio::test]
async fn revoked_session_still_appears_inactive_in_listing() {
    let (app, registered) = registered_app().await;
    let access_token = registered["accessToken"].as_str().unwrap();
    let refresh_token = registered["refreshToken"].as_str().unwrap();

    app.post_auth(
        "/auth/logout",
        json!({ "refreshToken": refresh_token }),
        access_token,
    )
    .await;

    // Access token is stateless and keeps working until expiry
    let (status, body) = app.get_auth("/auth/sessions", access_token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sessions"][0]["active"], false);
}

#[tokio::test]
async fn health_endpoint_reports_store_status() {
    let app = TestApp::spawn();

    let request = axum::http::Request::builder()
        .method("GET")
        .uri("/health")
        .body(axum::body::Body::empty())
        .unwrap();

    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["checks"]["store"], "up");
}
