//! Handlers for the `/auth` resource.
//!
//! Access tokens travel in JSON bodies; refresh tokens only in the
//! `HttpOnly` cookie described by [`CookieConfig`](crate::auth::cookie::CookieConfig).

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use staybook_core::error::CoreError;
use staybook_core::roles::Role;
use staybook_db::models::user::UserResponse;
use validator::Validate;

use crate::auth::cookie::{clear_refresh_cookie, read_cookie, refresh_cookie};
use crate::auth::service::{IssuedSession, RegisterInput};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AuthUser, CurrentUser};
use crate::middleware::body::{ApiForm, ApiJson};
use crate::middleware::client::ClientMeta;
use crate::state::AppState;

/// `token_type` reported alongside every access token.
pub const TOKEN_TYPE_BEARER: &str = "bearer";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 255, message = "name must be 1-255 characters"))]
    pub name: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 1, message = "password must not be empty"))]
    pub password: String,
    #[validate(length(max = 50, message = "phone must be at most 50 characters"))]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Role,
}

/// Form body for `POST /auth/login` (OAuth2 password-grant field names).
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    /// The account email.
    pub username: String,
    pub password: String,
}

/// Token body returned by login and refresh.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

/// Body returned by `POST /auth/register`.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct LogoutAllResponse {
    pub status: &'static str,
    pub revoked: u64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /auth/register
///
/// Create an account and sign it in. Returns 201 with an access token and
/// sets the refresh cookie.
pub async fn register(
    State(state): State<AppState>,
    meta: ClientMeta,
    ApiJson(input): ApiJson<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    let issued = state
        .sessions
        .register(
            RegisterInput {
                name: input.name,
                email: input.email.trim().to_string(),
                password: input.password,
                phone: input.phone,
                role: input.role,
            },
            &meta,
        )
        .await?;

    let cookie = set_refresh_cookie(&state, &issued)?;
    let body = RegisterResponse {
        access_token: issued.access_token,
        token_type: TOKEN_TYPE_BEARER,
        expires_in: issued.expires_in,
        user: UserResponse::from(&issued.user),
    };

    Ok((StatusCode::CREATED, [(SET_COOKIE, cookie)], Json(body)))
}

/// POST /auth/login
///
/// Authenticate with email + password (form-encoded). Returns an access
/// token and sets the refresh cookie.
pub async fn login(
    State(state): State<AppState>,
    meta: ClientMeta,
    ApiForm(form): ApiForm<LoginForm>,
) -> AppResult<impl IntoResponse> {
    let issued = state
        .sessions
        .login(form.username.trim(), &form.password, &meta)
        .await?;

    token_response(&state, issued)
}

/// POST /auth/refresh
///
/// Rotate the refresh cookie and return a new access token. The presented
/// refresh token is revoked and cannot be used again.
pub async fn refresh(
    State(state): State<AppState>,
    meta: ClientMeta,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let raw = read_cookie(&headers, &state.config.cookie.name);
    let issued = state.sessions.refresh(raw, &meta).await?;

    token_response(&state, issued)
}

/// POST /auth/logout
///
/// Revoke the session behind the refresh cookie (if any) and clear the
/// cookie. Always succeeds.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let raw = read_cookie(&headers, &state.config.cookie.name);
    state.sessions.logout(raw).await?;

    Ok((
        [(SET_COOKIE, clear_cookie(&state)?)],
        Json(StatusResponse { status: "ok" }),
    ))
}

/// POST /auth/logout-all
///
/// Revoke every session of the authenticated user and clear the cookie.
pub async fn logout_all(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<impl IntoResponse> {
    let revoked = state.sessions.logout_all(auth_user.user_id).await?;

    Ok((
        [(SET_COOKIE, clear_cookie(&state)?)],
        Json(LogoutAllResponse {
            status: "ok",
            revoked,
        }),
    ))
}

/// GET /auth/me
///
/// Profile of the authenticated user.
pub async fn me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from(&user))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn token_response(state: &AppState, issued: IssuedSession) -> AppResult<impl IntoResponse> {
    let cookie = set_refresh_cookie(state, &issued)?;
    let body = TokenResponse {
        access_token: issued.access_token,
        token_type: TOKEN_TYPE_BEARER,
        expires_in: issued.expires_in,
    };
    Ok(([(SET_COOKIE, cookie)], Json(body)))
}

fn set_refresh_cookie(state: &AppState, issued: &IssuedSession) -> AppResult<HeaderValue> {
    refresh_cookie(
        &state.config.cookie,
        &issued.refresh_token,
        state.sessions.refresh_cookie_max_age_secs(),
    )
    .map_err(|e| AppError::InternalError(format!("Refresh cookie encoding error: {e}")))
}

fn clear_cookie(state: &AppState) -> AppResult<HeaderValue> {
    clear_refresh_cookie(&state.config.cookie)
        .map_err(|e| AppError::InternalError(format!("Refresh cookie encoding error: {e}")))
}
