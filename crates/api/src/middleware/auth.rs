//! Bearer-token authentication extractors for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use staybook_core::error::AuthError;
use staybook_core::roles::Role;
use staybook_core::types::DbId;
use staybook_db::models::user::User;

use crate::error::AppError;
use crate::state::AppState;

/// Verified access-token claims from the `Authorization: Bearer` header.
///
/// Verification is stateless: the user row is not consulted. Use
/// [`CurrentUser`] when the handler needs the principal to still exist.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, role = %user.role, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user's internal database id (from `claims.sub`).
    pub user_id: DbId,
    /// The role embedded in the token at issue time.
    pub role: Role,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = state.sessions.verify_access_token(token)?;

        Ok(AuthUser {
            user_id: claims.sub,
            role: claims.role,
        })
    }
}

/// The authenticated user, loaded from the store.
///
/// Rejects with `PRINCIPAL_NOT_FOUND` when the token is valid but its subject
/// has been deleted. The role is read from the row, so a role change takes
/// effect before the access token expires.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = AuthUser::from_request_parts(parts, state).await?;
        let user = state.sessions.load_principal(auth.user_id).await?;
        Ok(CurrentUser(user))
    }
}

/// Pull the token out of `Authorization: Bearer <token>`.
///
/// A missing header is `TOKEN_MISSING`; any other scheme or an empty token
/// is `TOKEN_INVALID`.
fn bearer_token(parts: &Parts) -> Result<&str, AuthError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::TokenMissing)?
        .to_str()
        .map_err(|_| AuthError::TokenInvalid)?;

    let (scheme, token) = header.split_once(' ').ok_or(AuthError::TokenInvalid)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::TokenInvalid);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::TokenInvalid);
    }
    Ok(token)
}
