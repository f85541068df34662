//! Request extractors for authentication, authorization, and client metadata.
//!
//! - [`auth::AuthUser`] -- Verified access-token claims from a Bearer header.
//! - [`auth::CurrentUser`] -- [`auth::AuthUser`] plus the user row, which must still exist.
//! - [`rbac::RequireRoles`] -- Role gate; `ADMIN` always passes.
//! - [`client::ClientMeta`] -- User agent and client IP recorded on new sessions.
//! - [`body::ApiJson`] / [`body::ApiForm`] -- Request bodies rejected as JSON errors.

pub mod auth;
pub mod body;
pub mod client;
pub mod rbac;
