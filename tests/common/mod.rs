#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode, header};
use http_body_util::BodyExt;
use std::sync::Arc;
use tillpoint::db::{Database, User, UserRole};
use tillpoint::hub::Hub;
use tillpoint::{ServerConfig, create_app};
use tower::ServiceExt;

/// 32+ byte secret, long enough for startup validation.
pub const TEST_JWT_SECRET: &[u8] = b"test-secret-0123456789abcdef0123456789";

pub const TEST_PASSWORD: &str = "hunter2hunter2";

pub struct TestContext {
    pub app: Router,
    pub db: Database,
    pub hub: Arc<Hub>,
}

pub async fn setup() -> TestContext {
    let db = Database::open(":memory:").await.expect("open database");
    let hub = Arc::new(Hub::new());

    let config = ServerConfig {
        db: db.clone(),
        jwt_secret: TEST_JWT_SECRET.to_vec(),
        frontend_origin: None,
        hub: hub.clone(),
    };

    TestContext {
        app: create_app(&config),
        db,
        hub,
    }
}

/// Insert a user directly, bypassing the signup endpoint. Password is
/// always TEST_PASSWORD; low cost keeps the test suite fast.
pub async fn create_user(db: &Database, email: &str, role: UserRole) -> User {
    let hash = bcrypt::hash(TEST_PASSWORD, 4).expect("hash password");
    db.users()
        .create(email, &hash, "Test", "User", role)
        .await
        .expect("create user")
}

/// Log in through the API and return the access token from the JSON body.
pub async fn login(app: &Router, email: &str) -> String {
    let response = post_json(
        app,
        "/api/login",
        &serde_json::json!({ "email": email, "password": TEST_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    body["token"].as_str().expect("token in body").to_string()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get_with_cookie(app: &Router, uri: &str, cookie: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn post_json(app: &Router, uri: &str, body: &serde_json::Value) -> Response<Body> {
    send_json(app, "POST", uri, body, None).await
}

pub async fn post_json_auth(
    app: &Router,
    uri: &str,
    body: &serde_json::Value,
    token: &str,
) -> Response<Body> {
    send_json(app, "POST", uri, body, Some(token)).await
}

pub async fn put_json(app: &Router, uri: &str, body: &serde_json::Value) -> Response<Body> {
    send_json(app, "PUT", uri, body, None).await
}

pub async fn put_json_cookie(
    app: &Router,
    uri: &str,
    body: &serde_json::Value,
    cookie: &str,
) -> Response<Body> {
    let request = Request::builder()
        .method("PUT")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::COOKIE, cookie)
        .body(Body::from(body.to_string()))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn delete_with_cookie(app: &Router, uri: &str, cookie: &str) -> Response<Body> {
    let request = Request::builder()
        .method("DELETE")
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    body: &serde_json::Value,
    token: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn read_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("response body is JSON")
}

/// Collect all Set-Cookie header values from a response.
pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

/// Extract a cookie value ("name=value") from Set-Cookie headers.
pub fn cookie_pair(response: &Response<Body>, name: &str) -> String {
    let prefix = format!("{}=", name);
    set_cookies(response)
        .iter()
        .find(|c| c.starts_with(&prefix))
        .map(|c| c.split(';').next().unwrap().to_string())
        .unwrap_or_else(|| panic!("no {} cookie in response", name))
}
