//! Router-level tests

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use chrono::Duration;
use localx_auth::{TokenConfig, TokenService, hash_password};
use localx_db::{Database, NewUser, UserRole};
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

use super::create_router;
use crate::state::{AppState, MetricsHandle};

struct TestApp {
    router: Router,
    state: AppState,
}

impl TestApp {
    async fn new() -> Self {
        Self::build(None).await
    }

    async fn with_metrics(handle: MetricsHandle) -> Self {
        Self::build(Some(Arc::new(handle))).await
    }

    async fn build(metrics_handle: Option<Arc<MetricsHandle>>) -> Self {
        let db = Database::in_memory().await.unwrap();
        let tokens = Arc::new(TokenService::new(TokenConfig::new("router-test-secret")).unwrap());
        let state = AppState::new(db, tokens);
        Self {
            router: create_router(state.clone(), metrics_handle),
            state,
        }
    }

    async fn add_user(&self, email: &str, password: &str, role: UserRole) -> i64 {
        self.state
            .db
            .insert_user(NewUser {
                name: "Test User".to_string(),
                email: email.to_string(),
                password_hash: hash_password(password).unwrap(),
                role,
            })
            .await
            .unwrap()
            .id
    }

    fn token_for(&self, email: &str) -> String {
        self.state.tokens.issue(email).unwrap()
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, body)
    }

    async fn call(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    async fn create_tour(&self, admin_token: &str) -> String {
        let (status, body) = self
            .call(
                Method::POST,
                "/tours",
                Some(admin_token),
                Some(json!({
                    "title": "Old Town Walk",
                    "description": "Two hours on foot",
                    "price": 25.0,
                    "location": "Tbilisi",
                    "images": ["walk.jpg"]
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn test_healthz_and_metrics_endpoint() {
    // Current-thread runtime, so the local recorder sees every handler
    let recorder = PrometheusBuilder::new().build_recorder();
    let app = TestApp::with_metrics(recorder.handle()).await;
    let _guard = metrics::set_default_local_recorder(&recorder);

    let (status, body) = app.call(Method::GET, "/healthz", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, _) = app.call(Method::GET, "/users/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.call(Method::GET, "/metrics", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let text = body.as_str().unwrap();
    assert!(text.contains("localx_health_checks_total 1"), "{}", text);
    assert!(text.contains(r#"localx_auth_rejections_total{reason="missing_header"} 1"#), "{}", text);
}

#[tokio::test]
async fn test_metrics_route_absent_without_handle() {
    let app = TestApp::new().await;
    let (status, _) = app.call(Method::GET, "/metrics", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ==================== Users ====================

#[tokio::test]
async fn test_root_and_health() {
    let app = TestApp::new().await;

    let (status, body) = app.call(Method::GET, "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Welcome to LocalX API!");

    let (status, body) = app.call(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_register_login_me_flow() {
    let app = TestApp::new().await;

    let (status, body) = app
        .call(
            Method::POST,
            "/users/register",
            None,
            Some(json!({"name": "Alice", "email": "Alice@X.com", "password": "password123"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"], "alice@x.com");
    assert_eq!(body["message"], "User registered");

    // OAuth2 password form
    let request = Request::builder()
        .method(Method::POST)
        .uri("/users/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("username=alice%40x.com&password=password123"))
        .unwrap();
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "bearer");
    assert_eq!(body["expires_in"], 3600);
    let token = body["access_token"].as_str().unwrap().to_string();

    let (status, body) = app.call(Method::GET, "/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "alice@x.com");
    assert_eq!(body["name"], "Alice");
    assert_eq!(body["role"], "user");
}

#[tokio::test]
async fn test_register_duplicate_and_invalid() {
    let app = TestApp::new().await;
    let payload = json!({"name": "Bob", "email": "bob@x.com", "password": "password123"});

    let (status, _) = app.call(Method::POST, "/users/register", None, Some(payload.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.call(Method::POST, "/users/register", None, Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "User already exists");

    let (status, _) = app
        .call(
            Method::POST,
            "/users/register",
            None,
            Some(json!({"name": "Bob", "email": "not-an-email", "password": "password123"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_failures_share_one_message() {
    let app = TestApp::new().await;
    app.add_user("carol@x.com", "password123", UserRole::User).await;

    let (status, wrong_password) = app
        .call(
            Method::POST,
            "/users/login",
            None,
            Some(json!({"username": "carol@x.com", "password": "nope-nope"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, unknown_user) = app
        .call(
            Method::POST,
            "/users/login",
            None,
            Some(json!({"email": "dave@x.com", "password": "password123"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(wrong_password["detail"], "Incorrect email or password");
    assert_eq!(wrong_password, unknown_user);
}

#[tokio::test]
async fn test_me_rejects_bad_credentials() {
    let app = TestApp::new().await;
    app.add_user("erin@x.com", "password123", UserRole::User).await;

    let (status, _) = app.call(Method::GET, "/users/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.call(Method::GET, "/users/me", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Invalid token");

    let expired = app
        .state
        .tokens
        .issue_with_ttl("erin@x.com", Duration::minutes(-1))
        .unwrap();
    let (status, _) = app.call(Method::GET, "/users/me", Some(&expired), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let ghost = app.token_for("ghost@x.com");
    let (status, body) = app.call(Method::GET, "/users/me", Some(&ghost), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "User not found");

    let request = Request::builder()
        .uri("/users/me")
        .header(header::AUTHORIZATION, format!("Basic {}", app.token_for("erin@x.com")))
        .body(Body::empty())
        .unwrap();
    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ==================== Tours ====================

#[tokio::test]
async fn test_tours_crud_and_admin_gate() {
    let app = TestApp::new().await;
    app.add_user("admin@x.com", "password123", UserRole::Admin).await;
    app.add_user("user@x.com", "password123", UserRole::User).await;
    let admin = app.token_for("admin@x.com");
    let user = app.token_for("user@x.com");

    let payload = json!({"title": "Lake", "description": "Boat", "price": 10.0, "location": "Kazbegi"});
    let (status, body) = app.call(Method::POST, "/tours", Some(&user), Some(payload.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["detail"], "Access denied");

    let (status, _) = app.call(Method::POST, "/tours", None, Some(payload)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let tour_id = app.create_tour(&admin).await;

    let (status, body) = app.call(Method::GET, &format!("/tours/{}", tour_id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Old Town Walk");
    assert_eq!(body["images"], json!(["walk.jpg"]));

    let (status, body) = app.call(Method::GET, "/tours", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    for missing in ["/tours/999", "/tours/not-an-id"] {
        let (status, body) = app.call(Method::GET, missing, None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Tour not found");
    }

    let (status, _) = app
        .call(
            Method::POST,
            "/tours",
            Some(&admin),
            Some(json!({"title": "Bad", "description": "", "price": -1.0, "location": "X"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ==================== Bookings ====================

#[tokio::test]
async fn test_booking_lifecycle() {
    let app = TestApp::new().await;
    app.add_user("admin@x.com", "password123", UserRole::Admin).await;
    let alice_id = app.add_user("alice@x.com", "password123", UserRole::User).await;
    app.add_user("bob@x.com", "password123", UserRole::User).await;
    let admin = app.token_for("admin@x.com");
    let alice = app.token_for("alice@x.com");
    let bob = app.token_for("bob@x.com");
    let tour_id = app.create_tour(&admin).await;

    let (status, booking) = app
        .call(
            Method::POST,
            "/bookings",
            Some(&alice),
            Some(json!({"tour_id": tour_id, "date": "2025-08-01T09:00:00"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(booking["user_id"], alice_id.to_string());
    assert_eq!(booking["status"], "pending");
    assert_eq!(booking["date"], "2025-08-01T09:00:00");
    let booking_id = booking["id"].as_str().unwrap().to_string();

    let (_, mine) = app.call(Method::GET, "/bookings", Some(&alice), None).await;
    assert_eq!(mine.as_array().unwrap().len(), 1);
    let (_, theirs) = app.call(Method::GET, "/bookings", Some(&bob), None).await;
    assert!(theirs.as_array().unwrap().is_empty());

    let (status, _) = app.call(Method::GET, "/bookings/all", Some(&alice), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, all) = app.call(Method::GET, "/bookings/all", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 1);

    let confirm = format!("/bookings/{}/confirm", booking_id);
    let (status, _) = app.call(Method::PATCH, &confirm, Some(&alice), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, body) = app.call(Method::PATCH, &confirm, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Booking confirmed");
    let (_, mine) = app.call(Method::GET, "/bookings", Some(&alice), None).await;
    assert_eq!(mine[0]["status"], "confirmed");

    // Bob cannot cancel Alice's booking
    let cancel = format!("/bookings/{}", booking_id);
    let (status, body) = app.call(Method::DELETE, &cancel, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Booking not found or not allowed to cancel");

    let (status, body) = app.call(Method::DELETE, &cancel, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Booking canceled");

    let (status, _) = app.call(Method::DELETE, &cancel, Some(&alice), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_cancel_and_missing_bookings() {
    let app = TestApp::new().await;
    app.add_user("admin@x.com", "password123", UserRole::Admin).await;
    app.add_user("alice@x.com", "password123", UserRole::User).await;
    let admin = app.token_for("admin@x.com");
    let alice = app.token_for("alice@x.com");
    let tour_id = app.create_tour(&admin).await;

    let (_, booking) = app
        .call(
            Method::POST,
            "/bookings",
            Some(&alice),
            Some(json!({"tour_id": tour_id, "date": "2025-08-01T09:00:00"})),
        )
        .await;
    let admin_cancel = format!("/bookings/{}/admin", booking["id"].as_str().unwrap());

    let (status, _) = app.call(Method::DELETE, &admin_cancel, Some(&alice), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.call(Method::DELETE, &admin_cancel, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Booking canceled by admin");

    let (status, body) = app.call(Method::DELETE, &admin_cancel, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Booking not found");

    let (status, _) = app.call(Method::PATCH, "/bookings/77/confirm", Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_booking_validation() {
    let app = TestApp::new().await;
    app.add_user("admin@x.com", "password123", UserRole::Admin).await;
    app.add_user("alice@x.com", "password123", UserRole::User).await;
    let alice = app.token_for("alice@x.com");
    let tour_id = app.create_tour(&app.token_for("admin@x.com")).await;

    let (status, _) = app
        .call(
            Method::POST,
            "/bookings",
            None,
            Some(json!({"tour_id": tour_id, "date": "2025-08-01T09:00:00"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .call(
            Method::POST,
            "/bookings",
            Some(&alice),
            Some(json!({"tour_id": tour_id, "date": "01/08/2025"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .call(
            Method::POST,
            "/bookings",
            Some(&alice),
            Some(json!({"tour_id": "12345", "date": "2025-08-01T09:00:00"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Tour not found");
}
