//! Test helper module for identity-service integration tests.
//!
//! Builds the full router over the in-memory store and drives it with
//! `tower::ServiceExt::oneshot`, no listening socket needed.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::connect_info::MockConnectInfo,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use identity_service::{
    build_router,
    config::{Environment, IdentityConfig, JwtConfig, SecurityConfig, SmtpConfig},
    db::{IdentityStore, MemoryStore},
    services::{
        AuthService, JwtService, Notification, NotificationQueue, NotificationSender,
        SessionRegistry,
    },
    AppState,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// Sender that records every notification instead of delivering it.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<Notification>>,
}

#[async_trait]
impl NotificationSender for RecordingNotifier {
    async fn send(&self, notification: Notification) -> Result<(), anyhow::Error> {
        self.sent.lock().unwrap().push(notification);
        Ok(())
    }
}

pub fn test_config() -> IdentityConfig {
    IdentityConfig {
        environment: Environment::Dev,
        service_name: "identity-service-test".to_string(),
        service_version: "0.0.0".to_string(),
        log_level: "debug".to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        jwt: JwtConfig {
            access_secret: "test-access-secret".to_string(),
            refresh_secret: "test-refresh-secret".to_string(),
            access_token_expiry_minutes: 60,
            refresh_token_expiry_days: 7,
        },
        smtp: SmtpConfig {
            enabled: false,
            host: String::new(),
            port: 587,
            user: String::new(),
            password: String::new(),
        },
        security: SecurityConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
        },
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestApp {
    pub fn spawn() -> Self {
        let config = test_config();

        let db = IdentityStore::new(Arc::new(MemoryStore::new()));
        let jwt = JwtService::new(&config.jwt).expect("Failed to create JWT service");

        let notifier = Arc::new(RecordingNotifier::default());
        let notifications =
            NotificationQueue::start(notifier.clone() as Arc<dyn NotificationSender>);

        let sessions = SessionRegistry::new(db.clone(), jwt.clone());
        let auth_service = AuthService::new(db.clone(), jwt.clone(), sessions, notifications);

        let state = AppState {
            config,
            db,
            jwt,
            auth_service,
        };

        let router = build_router(state.clone())
            .layer(MockConnectInfo(SocketAddr::from(([127, 0, 0, 1], 50000))));

        TestApp {
            router,
            state,
            notifier,
        }
    }

    pub async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.send(post_request(path, body, None)).await
    }

    pub async fn post_auth(
        &self,
        path: &str,
        body: Value,
        access_token: &str,
    ) -> (StatusCode, Value) {
        self.send(post_request(path, body, Some(access_token))).await
    }

    pub async fn get_auth(&self, path: &str, access_token: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .header(header::AUTHORIZATION, format!("Bearer {}", access_token))
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("request failed");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("failed to read body")
            .to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response was not JSON")
        };

        (status, body)
    }

    /// Register a user and return the response body.
    pub async fn register_user(&self, username: &str, email: &str, password: &str) -> Value {
        let (status, body) = self.post("/auth/register", register_body(username, email, password))
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
        body
    }
}

pub fn post_request(path: &str, body: Value, access_token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::USER_AGENT, "Mozilla/5.0 (X11; Linux x86_64)");

    if let Some(token) = access_token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn register_body(username: &str, email: &str, password: &str) -> Value {
    json!({
        "username": username,
        "email": email,
        "password": password,
        "firstName": "Alice",
        "lastName": "Lidell",
    })
}
