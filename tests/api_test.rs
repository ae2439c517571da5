//! Router-level tests.
//!
//! The real services run against a disconnected database: every case here
//! is decided by authentication, role checks or request validation before
//! a query would be issued.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use hostel_manager::api::{create_router, AppState};
use hostel_manager::config::Config;
use hostel_manager::domain::UserRole;
use hostel_manager::errors::{AppError, AppResult};
use hostel_manager::infra::{Database, DistributedLock, LockGuard, RateLimitStore};
use hostel_manager::jobs::NotificationJob;
use hostel_manager::services::{Claims, Notifier, Services};

const SECRET: &str = "integration-test-secret-at-least-32-chars";

/// Allows up to `max` requests in total.
struct CountingLimiter {
    max: u64,
    seen: AtomicU64,
}

impl CountingLimiter {
    fn unlimited() -> Self {
        Self::with_max(u64::MAX)
    }

    fn with_max(max: u64) -> Self {
        Self {
            max,
            seen: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl RateLimitStore for CountingLimiter {
    async fn check_rate_limit(
        &self,
        _identifier: &str,
        _max_requests: u64,
        _window_seconds: u64,
    ) -> AppResult<(u64, bool)> {
        let count = self.seen.fetch_add(1, Ordering::SeqCst) + 1;
        Ok((count, count <= self.max))
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

struct NoLock;

#[async_trait]
impl DistributedLock for NoLock {
    async fn acquire(&self, _resource: &str) -> AppResult<LockGuard> {
        Ok(LockGuard::detached())
    }
}

struct DropNotifier;

#[async_trait]
impl Notifier for DropNotifier {
    async fn notify(&self, _job: NotificationJob) -> AppResult<()> {
        Err(AppError::internal("queue unavailable in tests"))
    }
}

fn app_with(limiter: CountingLimiter) -> Router {
    let services = Services::from_connection(
        DatabaseConnection::Disconnected,
        Config::for_secret(SECRET),
        Arc::new(NoLock),
        Arc::new(DropNotifier),
    );
    let state = AppState::new(
        &services,
        Arc::new(limiter),
        Arc::new(Database::from_connection(DatabaseConnection::Disconnected)),
    );
    create_router(state)
}

fn app() -> Router {
    app_with(CountingLimiter::unlimited())
}

fn token(role: UserRole) -> String {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: Uuid::new_v4(),
        email: format!("{}@example.com", role),
        role,
        exp: now + 3600,
        iat: now,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

fn request(method: Method, uri: &str, role: Option<UserRole>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(role) = role {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token(role)));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn hostel_form(pincode: &str) -> Value {
    json!({
        "name": "North Block",
        "address_line": "1 College Road",
        "city": "Bengaluru",
        "state": "Karnataka",
        "pincode": pincode,
        "capacity": 50
    })
}

#[tokio::test]
async fn test_root_and_openapi_are_public() {
    let response = app()
        .oneshot(request(Method::GET, "/", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (status, doc) = send(app(), request(Method::GET, "/api-docs/openapi.json", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/api/room-allocation/requests/{id}/approve"].is_object());
}

#[tokio::test]
async fn test_health_reports_unreachable_database() {
    let (status, body) = send(app(), request(Method::GET, "/health", None, None)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["services"]["database"]["status"], "unhealthy");
    assert_eq!(body["services"]["redis"]["status"], "healthy");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let (status, body) = send(app(), request(Method::GET, "/api/user-profiles/me", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    let bad = Request::builder()
        .uri("/api/room-allocation/requests/mine")
        .header(header::AUTHORIZATION, "Bearer not-a-jwt")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(app(), bad).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_students_cannot_use_admin_endpoints() {
    let (status, body) = send(
        app(),
        request(Method::POST, "/api/admin/hostels", Some(UserRole::Student), Some(hostel_form("560001"))),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");

    let approve = format!("/api/room-allocation/requests/{}/approve", Uuid::new_v4());
    let (status, _) = send(
        app(),
        request(Method::POST, &approve, Some(UserRole::Student), Some(json!({ "room_id": Uuid::new_v4() }))),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_wardens_cannot_approve_but_can_read_queue_filters() {
    let approve = format!("/api/room-allocation/requests/{}/approve", Uuid::new_v4());
    let (status, _) = send(
        app(),
        request(Method::POST, &approve, Some(UserRole::Warden), Some(json!({ "room_id": Uuid::new_v4() }))),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // rejected while parsing the filter, before any query
    let (status, body) = send(
        app(),
        request(Method::GET, "/api/room-allocation/requests?status=done", Some(UserRole::Warden), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Invalid request status: done");
}

#[tokio::test]
async fn test_short_pincode_blocks_hostel_creation() {
    let (status, body) = send(
        app(),
        request(Method::POST, "/api/admin/hostels", Some(UserRole::Admin), Some(hostel_form("123"))),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["fields"]["pincode"][0], "Pincode must be 6 digits");
}

#[tokio::test]
async fn test_room_form_bounds_are_enforced() {
    let form = json!({
        "hostel_id": Uuid::new_v4(),
        "room_number": "101",
        "floor": 9,
        "room_type": "double",
        "capacity": 11
    });
    let (status, body) = send(
        app(),
        request(Method::POST, "/api/admin/rooms", Some(UserRole::Admin), Some(form)),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["fields"]["capacity"][0], "Capacity must be between 1 and 10");
    assert_eq!(body["error"]["fields"]["floor"][0], "Floor must be between 1 and 8");
}

#[tokio::test]
async fn test_reset_password_mismatch_is_reported_on_confirm_password() {
    let (status, body) = send(
        app(),
        request(
            Method::POST,
            "/api/auth/reset-password",
            Some(UserRole::Student),
            Some(json!({ "password": "Secret123", "confirm_password": "Secret124" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields = body["error"]["fields"].as_object().unwrap();
    assert_eq!(fields["confirm_password"][0], "Passwords don't match");
    assert!(!fields.contains_key("password"));
}

#[tokio::test]
async fn test_reset_password_requires_login() {
    let (status, _) = send(
        app(),
        request(
            Method::POST,
            "/api/auth/reset-password",
            None,
            Some(json!({ "password": "Secret123", "confirm_password": "Secret123" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_rejects_fake_phone_and_weak_password() {
    let (status, body) = send(
        app(),
        request(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "email": "asha@example.com",
                "password": "short",
                "full_name": "Asha Rao",
                "phone": "9876543210"
            })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["fields"]["phone"][0], "Enter a valid 10-digit mobile number");
    assert_eq!(
        body["error"]["fields"]["password"][0],
        "Password must be at least 8 characters"
    );
}

#[tokio::test]
async fn test_malformed_json_is_a_bad_request() {
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(app(), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_approve_without_room_id_uses_error_body() {
    let uri = format!("/api/room-allocation/requests/{}/approve", Uuid::new_v4());
    let (status, body) = send(
        app(),
        request(Method::POST, &uri, Some(UserRole::Admin), Some(json!({}))),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("room_id"));
}

#[tokio::test]
async fn test_unknown_complaint_status_in_body_uses_error_body() {
    let uri = format!("/api/complaints/{}/status", Uuid::new_v4());
    let (status, body) = send(
        app(),
        request(
            Method::PATCH,
            &uri,
            Some(UserRole::Warden),
            Some(json!({ "status": "done" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_auth_routes_are_rate_limited() {
    let app = app_with(CountingLimiter::with_max(0));
    let response = app
        .oneshot(request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "a@example.com", "password": "x" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key("retry-after"));
}
