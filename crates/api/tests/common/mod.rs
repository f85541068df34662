#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use staybook_core::clock::Clock;
use tower::ServiceExt;

use staybook_api::auth::cookie::CookieConfig;
use staybook_api::auth::jwt::JwtConfig;
use staybook_api::auth::password::PasswordConfig;
use staybook_api::config::ServerConfig;
use staybook_api::router::build_app_router;
use staybook_api::state::AppState;

pub const COOKIE_NAME: &str = "refresh_token";

/// Build a test `ServerConfig` with fixed secrets and cheap Argon2 costs.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 14,
            refresh_token_pepper: "integration-test-pepper".to_string(),
        },
        cookie: CookieConfig::default(),
        password: PasswordConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        },
    }
}

/// Build the full application router (same middleware stack as `main.rs`).
pub fn build_test_app(pool: PgPool) -> Router {
    build_app_router(AppState::new(pool, test_config()))
}

/// Like [`build_test_app`] but on a caller-controlled clock.
pub fn build_test_app_with_clock(pool: PgPool, clock: Arc<dyn Clock>) -> Router {
    build_app_router(AppState::with_clock(pool, test_config(), clock))
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

/// POST an `application/x-www-form-urlencoded` login form.
pub async fn post_login(app: Router, email: &str, password: &str) -> Response<Body> {
    let body = serde_urlencoded::to_string([("username", email), ("password", password)]).unwrap();
    post_raw(app, "/auth/login", "application/x-www-form-urlencoded", body).await
}

/// POST a raw body with the given content type.
pub async fn post_raw(
    app: Router,
    uri: &str,
    content_type: &str,
    body: impl Into<String>,
) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, content_type)
        .body(Body::from(body.into()))
        .unwrap();
    send(app, request).await
}

/// POST with an optional refresh cookie and no body.
pub async fn post_cookie(app: Router, uri: &str, refresh_token: Option<&str>) -> Response<Body> {
    let mut builder = Request::builder().method(Method::POST).uri(uri);
    if let Some(token) = refresh_token {
        builder = builder.header(COOKIE, format!("{COOKIE_NAME}={token}"));
    }
    send(app, builder.body(Body::empty()).unwrap()).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// The raw `Set-Cookie` header of a response, if any.
pub fn set_cookie_header(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(SET_COOKIE)
        .map(|v| v.to_str().unwrap().to_string())
}

/// The refresh token value carried by a response's `Set-Cookie` header.
pub fn refresh_token_from(response: &Response<Body>) -> String {
    let header = set_cookie_header(response).expect("response must set the refresh cookie");
    let (pair, _) = header.split_once(';').unwrap();
    let (name, value) = pair.split_once('=').unwrap();
    assert_eq!(name, COOKIE_NAME);
    value.to_string()
}

/// Register through the API and return `(json body, refresh token)`.
pub async fn register(app: Router, email: &str, password: &str) -> (serde_json::Value, String) {
    register_as(app, email, password, "USER").await
}

pub async fn register_as(
    app: Router,
    email: &str,
    password: &str,
    role: &str,
) -> (serde_json::Value, String) {
    let body = serde_json::json!({
        "name": "Test User",
        "email": email,
        "password": password,
        "role": role,
    });
    let response = post_json(app, "/auth/register", body).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    let token = refresh_token_from(&response);
    (body_json(response).await, token)
}
