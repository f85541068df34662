pub mod auth;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the application route tree (health routes are merged separately).
///
/// ```text
/// /auth/register                                   register (public)
/// /auth/login                                      login (public)
/// /auth/refresh                                    rotate refresh cookie (public)
/// /auth/logout                                     revoke current session (public)
/// /auth/logout-all                                 revoke all sessions (requires auth)
/// /auth/me                                         current user (requires auth)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/auth", auth::router())
}
