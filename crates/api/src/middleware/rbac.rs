//! Role-based access control (RBAC) extractors.
//!
//! [`RequireRoles`] wraps [`CurrentUser`] and checks the user's role against a
//! [`RolePolicy`] allow-set via [`authorize`]. `ADMIN` passes every policy,
//! including the empty one, so [`AdminPolicy`] means "admins only".

use std::marker::PhantomData;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use staybook_core::roles::{authorize, Role};

use super::auth::CurrentUser;
use crate::error::AppError;
use crate::state::AppState;

/// A named allow-set of roles.
pub trait RolePolicy: Send + Sync + 'static {
    const ALLOWED: &'static [Role];
}

/// Hosts (and admins).
pub struct HostPolicy;

impl RolePolicy for HostPolicy {
    const ALLOWED: &'static [Role] = &[Role::Host];
}

/// Any registered account (and admins).
pub struct MemberPolicy;

impl RolePolicy for MemberPolicy {
    const ALLOWED: &'static [Role] = &[Role::User, Role::Host];
}

/// Admins only.
pub struct AdminPolicy;

impl RolePolicy for AdminPolicy {
    const ALLOWED: &'static [Role] = &[];
}

/// Requires the current user's role to satisfy `P`. Rejects with 403
/// Forbidden otherwise.
///
/// ```ignore
/// async fn create_listing(RequireHost { user, .. }: RequireHost) -> AppResult<Json<()>> {
///     // user.0 is a HOST or an ADMIN here
///     Ok(Json(()))
/// }
/// ```
pub struct RequireRoles<P: RolePolicy> {
    pub user: CurrentUser,
    _policy: PhantomData<P>,
}

impl<P: RolePolicy> FromRequestParts<AppState> for RequireRoles<P> {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let current = CurrentUser::from_request_parts(parts, state).await?;
        let user = &current.0;

        if let Err(err) = authorize(user.role, P::ALLOWED) {
            tracing::debug!(
                user_id = user.id,
                role = %user.role,
                path = %parts.uri.path(),
                "Role not permitted"
            );
            return Err(err.into());
        }
        Ok(RequireRoles {
            user: current,
            _policy: PhantomData,
        })
    }
}

pub type RequireHost = RequireRoles<HostPolicy>;
pub type RequireMember = RequireRoles<MemberPolicy>;
pub type RequireAdmin = RequireRoles<AdminPolicy>;
