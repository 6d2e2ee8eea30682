use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

use poolpass_server::config::Config;
use poolpass_server::models::QrPayload;
use poolpass_server::routes::create_routes;
use poolpass_server::state::AppState;
use poolpass_server::store::InMemoryPassStore;

fn test_config() -> Config {
    Config {
        database_url: "postgres://unused".to_string(),
        max_connections: 1,
        port: 0,
        jwt_secret: "integration-secret".to_string(),
        jwt_ttl_hours: 24,
        production: false,
    }
}

fn app() -> (Router, InMemoryPassStore) {
    let store = InMemoryPassStore::with_default_catalog();
    let router = create_routes(AppState::new(store.clone(), test_config()));
    (router, store)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_json(uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

async fn register(app: &Router, username: &str) -> String {
    let (status, body) = send(
        app,
        post_json(
            "/api/auth/register",
            json!({
                "username": username,
                "email": format!("{}@example.com", username),
                "password": "lane-four",
                "fullName": "Ada Swimmer",
                "phone": "555-0100"
            }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["token"].as_str().unwrap().to_string()
}

async fn buy_daily_pass(app: &Router, token: &str) -> Value {
    let (_, pass_types) = send(app, get("/api/pass-types", None)).await;
    let daily_id = pass_types[0]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        app,
        post_json(
            "/api/payments/mock-process",
            json!({ "paymentId": "mock_payment_1", "passTypeId": daily_id, "amount": 5.0 }),
            Some(token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    body["pass"].clone()
}

/// The exact string the holder's QR code carries.
fn payload_of(pass: &Value) -> String {
    serde_json::from_value::<QrPayload>(pass["qrData"].clone())
        .unwrap()
        .encode()
        .unwrap()
}

#[tokio::test]
async fn health_reports_ok_with_security_headers() {
    let (app, _) = app();

    let response = app.clone().oneshot(get("/health", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    assert_eq!(response.headers()["x-frame-options"], "DENY");
    assert!(response.headers().get("strict-transport-security").is_none());

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    let fields: Vec<&str> = body.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(fields, vec!["status", "timestamp"]);
    assert_eq!(body["status"], "OK");
    assert!(body["timestamp"].as_str().unwrap().parse::<DateTime<Utc>>().is_ok());
}

#[tokio::test]
async fn pass_types_are_ordered_by_duration() {
    let (app, _) = app();

    let (status, body) = send(&app, get("/api/pass-types", None)).await;

    assert_eq!(status, StatusCode::OK);
    let days: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|pt| pt["duration_days"].as_i64().unwrap())
        .collect();
    assert_eq!(days, vec![1, 30, 365]);
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let (app, _) = app();
    register(&app, "ada").await;

    let (status, body) = send(
        &app,
        post_json(
            "/api/auth/register",
            json!({
                "username": "ada",
                "email": "someone-else@example.com",
                "password": "pw",
                "fullName": "Another Ada"
            }),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "User already exists");
}

#[tokio::test]
async fn login_checks_password() {
    let (app, _) = app();
    register(&app, "ada").await;

    let (status, body) = send(
        &app,
        post_json(
            "/api/auth/login",
            json!({ "email": "ada@example.com", "password": "wrong" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid credentials");

    let (status, body) = send(
        &app,
        post_json(
            "/api/auth/login",
            json!({ "email": "ada@example.com", "password": "lane-four" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["user"]["fullName"], "Ada Swimmer");
    assert!(body["user"].get("passwordHash").is_none());
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let (app, _) = app();

    let (status, body) = send(&app, get("/api/user-passes", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Access token required");

    let (status, body) = send(&app, get("/api/pool-entries", Some("garbage"))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Invalid token");
}

#[tokio::test]
async fn purchased_pass_admits_holder_and_logs_entry() {
    let (app, store) = app();
    let token = register(&app, "ada").await;
    let pass = buy_daily_pass(&app, &token).await;
    assert!(pass["qrCode"]
        .as_str()
        .unwrap()
        .starts_with("data:image/svg+xml;base64,"));

    let (status, body) = send(
        &app,
        post_json(
            "/api/verify-qr",
            json!({ "qrData": payload_of(&pass), "staffId": "lifeguard-1" }),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["message"], "Access granted");
    assert_eq!(body["user"]["name"], "Ada Swimmer");
    assert_eq!(body["user"]["email"], "ada@example.com");
    assert_eq!(body["user"]["passType"], "Daily Pass");
    assert!(body["user"]["validUntil"].is_string());
    assert_eq!(store.entries().len(), 1);

    let (status, entries) = send(&app, get("/api/pool-entries", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(entries[0]["staff_id"], "lifeguard-1");
    assert_eq!(entries[0]["pass_type_name"], "Daily Pass");
}

#[tokio::test]
async fn missing_staff_id_is_logged_as_staff() {
    let (app, store) = app();
    let token = register(&app, "ada").await;
    let pass = buy_daily_pass(&app, &token).await;

    let (status, _) = send(
        &app,
        post_json("/api/verify-qr", json!({ "qrData": payload_of(&pass) }), None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(store.entries()[0].staff_id, "staff");
}

#[tokio::test]
async fn long_usernames_and_staff_ids_are_accepted() {
    let (app, store) = app();
    let username = "ada-lovelace-".repeat(8);
    let token = register(&app, &username).await;
    let pass = buy_daily_pass(&app, &token).await;
    let staff_id = format!("north-gate-{}", "x".repeat(190));

    let (status, body) = send(
        &app,
        post_json(
            "/api/verify-qr",
            json!({ "qrData": payload_of(&pass), "staffId": staff_id }),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(store.entries()[0].staff_id, staff_id);
}

#[tokio::test]
async fn malformed_scans_are_denied_without_writes() {
    let (app, store) = app();

    let (status, body) = send(
        &app,
        post_json("/api/verify-qr", json!({ "qrData": "not-json" }), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid QR code format");
    assert_eq!(body["code"], "MALFORMED_PAYLOAD");

    let request = Request::builder()
        .method("POST")
        .uri("/api/verify-qr")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{{{"))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MALFORMED_PAYLOAD");

    assert!(store.entries().is_empty());
}

#[tokio::test]
async fn unknown_pass_is_not_found() {
    let (app, _) = app();
    let payload = json!({
        "userId": "6f1c1f6e-3a43-4d5e-9d55-1b0a6f3f7c11",
        "passId": "0b7e3f0c-9a3e-4c1e-8f5a-2d2f6d6c9e01",
        "passType": "Daily Pass",
        "startDate": "2024-01-09T08:00:00Z",
        "endDate": "2024-01-10T08:00:00Z",
        "timestamp": 1704787200000_i64
    });

    let (status, body) = send(
        &app,
        post_json("/api/verify-qr", json!({ "qrData": payload.to_string() }), None),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Invalid or expired pass");
    assert_eq!(body["code"], "NOT_FOUND_OR_INACTIVE");
}

#[tokio::test]
async fn past_due_pass_is_expired_then_inactive() {
    let (app, store) = app();
    let token = register(&app, "ada").await;
    let pass = buy_daily_pass(&app, &token).await;
    let pass_id = pass["id"].as_str().unwrap().parse().unwrap();
    store.set_pass_dates(
        pass_id,
        NaiveDate::from_ymd_opt(2024, 1, 9).unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
    );
    let scan = json!({ "qrData": payload_of(&pass) });

    let (status, body) = send(&app, post_json("/api/verify-qr", scan.clone(), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Pass has expired");
    assert_eq!(store.pass(pass_id).unwrap().status, "expired");

    let (status, body) = send(&app, post_json("/api/verify-qr", scan, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND_OR_INACTIVE");
    assert!(store.entries().is_empty());

    let (_, passes) = send(&app, get("/api/user-passes", Some(&token))).await;
    assert_eq!(passes[0]["status"], "expired");
    assert!(passes[0]["qrCode"].is_null());
}

#[tokio::test]
async fn user_passes_show_qr_for_usable_passes() {
    let (app, _) = app();
    let token = register(&app, "ada").await;
    buy_daily_pass(&app, &token).await;

    let (status, passes) = send(&app, get("/api/user-passes", Some(&token))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(passes.as_array().unwrap().len(), 1);
    assert_eq!(passes[0]["pass_type_name"], "Daily Pass");
    assert!(passes[0]["qrCode"].is_string());
}

#[tokio::test]
async fn unknown_pass_type_cannot_be_bought() {
    let (app, store) = app();
    let token = register(&app, "ada").await;

    let (status, body) = send(
        &app,
        post_json(
            "/api/payments/mock-process",
            json!({ "paymentId": "mock_payment_2", "passTypeId": "00000000-0000-4000-8000-000000000000" }),
            Some(&token),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Pass type not found");
    assert!(store.payments().is_empty());
}
