use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use gains::server::{init_db, router, AppState, ServerConfig};

async fn app() -> (Router, TempDir) {
    let dir = TempDir::new().unwrap();
    let pool = init_db(&dir.path().join("gains.db")).await.unwrap();
    let config = ServerConfig {
        jwt_secret: "test-secret".to_string(),
        bcrypt_cost: 4,
        ..ServerConfig::default()
    };
    (router(AppState::new(pool, &config), &[]), dir)
}

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn register(app: &Router, email: &str) -> String {
    let (status, body) = call(
        app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "email": email, "password": "secret123", "name": "Sam" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let (app, _dir) = app().await;

    let (status, body) = call(&app, Method::GET, "/api/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let (app, _dir) = app().await;

    let (status, body) = call(&app, Method::GET, "/api/nope", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Route not found");

    let (status, _) = call(&app, Method::GET, "/elsewhere", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_register_and_login() {
    let (app, _dir) = app().await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "email": "sam@example.com", "password": "secret123", "name": "Sam" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User created successfully");
    assert_eq!(body["user"]["email"], "sam@example.com");
    assert_eq!(body["user"]["name"], "Sam");
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "sam@example.com", "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["user"]["email"], "sam@example.com");
}

#[tokio::test]
async fn test_register_validation() {
    let (app, _dir) = app().await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "email": "", "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email and password are required");

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "email": "a@example.com", "password": "12345" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Password must be at least 6 characters");

    register(&app, "a@example.com").await;
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "email": "a@example.com", "password": "another1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "User already exists");
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let (app, _dir) = app().await;
    register(&app, "sam@example.com").await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "sam@example.com", "password": "wrong-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "nobody@example.com", "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "sam@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email and password are required");
}

#[tokio::test]
async fn test_verify() {
    let (app, _dir) = app().await;
    let token = register(&app, "sam@example.com").await;

    let (status, body) = call(&app, Method::GET, "/api/auth/verify", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], true);
    assert_eq!(body["user"]["email"], "sam@example.com");

    let (status, body) = call(&app, Method::GET, "/api/auth/verify", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["valid"], false);
    assert_eq!(body["error"], "No token provided");

    let (status, body) =
        call(&app, Method::GET, "/api/auth/verify", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["valid"], false);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid token"));
}

#[tokio::test]
async fn test_data_routes_require_token() {
    let (app, _dir) = app().await;

    let (status, body) = call(&app, Method::GET, "/api/data/sync", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Access denied. No token provided.");

    let (status, body) =
        call(&app, Method::GET, "/api/data/sync", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid token.");

    let (status, _) = call(&app, Method::GET, "/api/users/profile", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_sync_round_trip() {
    let (app, _dir) = app().await;
    let token = register(&app, "sam@example.com").await;

    let (status, body) = call(&app, Method::GET, "/api/data/sync", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"], json!({}));

    let document = json!({
        "workouts": [{ "id": "1", "type": "Push" }],
        "preferences": { "theme": "dark" }
    });
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/data/sync",
        Some(&token),
        Some(json!({ "data": document })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Data synced successfully");

    let (_, body) = call(&app, Method::GET, "/api/data/sync", Some(&token), None).await;
    assert_eq!(body["data"], document);

    // Keys absent from a later push are left alone
    call(
        &app,
        Method::POST,
        "/api/data/sync",
        Some(&token),
        Some(json!({ "data": { "preferences": { "theme": "light" } } })),
    )
    .await;
    let (_, body) = call(&app, Method::GET, "/api/data/sync", Some(&token), None).await;
    assert_eq!(body["data"]["preferences"]["theme"], "light");
    assert_eq!(body["data"]["workouts"][0]["type"], "Push");
}

#[tokio::test]
async fn test_sync_rejects_bad_payloads() {
    let (app, _dir) = app().await;
    let token = register(&app, "sam@example.com").await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/data/sync",
        Some(&token),
        Some(json!({ "data": [1, 2, 3] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid data format");

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/data/sync",
        Some(&token),
        Some(json!({ "data": { "bad key!": 1 } })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid data type: bad key!");
}

#[tokio::test]
async fn test_single_data_type() {
    let (app, _dir) = app().await;
    let token = register(&app, "sam@example.com").await;

    let (status, body) =
        call(&app, Method::GET, "/api/data/workouts", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["dataType"], "workouts");
    assert_eq!(body["data"], json!({}));

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/data/workouts",
        Some(&token),
        Some(json!({ "data": [{ "id": "w1" }] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "workouts data saved successfully");

    let (_, body) = call(&app, Method::GET, "/api/data/workouts", Some(&token), None).await;
    assert_eq!(body["data"], json!([{ "id": "w1" }]));

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/data/workouts",
        Some(&token),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Data is required");

    let (status, body) =
        call(&app, Method::DELETE, "/api/data/workouts", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "workouts data deleted successfully");

    let (_, body) = call(&app, Method::GET, "/api/data/workouts", Some(&token), None).await;
    assert_eq!(body["data"], json!({}));
}

#[tokio::test]
async fn test_users_cannot_see_each_others_data() {
    let (app, _dir) = app().await;
    let alice = register(&app, "alice@example.com").await;
    let bob = register(&app, "bob@example.com").await;

    call(
        &app,
        Method::POST,
        "/api/data/sync",
        Some(&alice),
        Some(json!({ "data": { "meals": ["oats"] } })),
    )
    .await;

    let (_, body) = call(&app, Method::GET, "/api/data/sync", Some(&bob), None).await;
    assert_eq!(body["data"], json!({}));
}

#[tokio::test]
async fn test_profile() {
    let (app, _dir) = app().await;
    let token = register(&app, "sam@example.com").await;

    let (status, body) =
        call(&app, Method::GET, "/api/users/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "sam@example.com");
    assert_eq!(body["name"], "Sam");

    let (status, body) = call(
        &app,
        Method::PUT,
        "/api/users/profile",
        Some(&token),
        Some(json!({ "name": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Name cannot be empty");

    let (status, body) = call(
        &app,
        Method::PUT,
        "/api/users/profile",
        Some(&token),
        Some(json!({ "name": "Samantha" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Profile updated successfully");
    assert_eq!(body["user"]["name"], "Samantha");

    let (_, body) = call(&app, Method::GET, "/api/users/profile", Some(&token), None).await;
    assert_eq!(body["name"], "Samantha");
}
