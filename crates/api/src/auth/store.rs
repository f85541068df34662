//! The credential store seam between the session manager and persistence.
//!
//! [`CredentialStore`] is what the session manager calls into; it never sees
//! a pool or a transaction. Every method is atomic on its own, and the
//! multi-row operations ([`insert_user`](CredentialStore::insert_user),
//! [`rotate_session`](CredentialStore::rotate_session)) commit all-or-nothing.
//! Uniqueness of `users.email` and `user_sessions.refresh_token_hash` is
//! enforced by the store, not by callers.

use async_trait::async_trait;
use staybook_core::types::{DbId, Timestamp};
use staybook_db::models::session::{NewSession, UserSession};
use staybook_db::models::user::{CreateUser, User};
use staybook_db::repositories::{SessionRepo, UserRepo};
use staybook_db::DbPool;

/// Unique constraint on `users.email`.
const EMAIL_CONSTRAINT: &str = "uq_users_email";
/// Unique constraint on `user_sessions.refresh_token_hash`.
const TOKEN_HASH_CONSTRAINT: &str = "uq_user_sessions_refresh_token_hash";

/// Errors surfaced by a [`CredentialStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Refresh token hash collision")]
    DuplicateTokenHash,

    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    /// Classify PostgreSQL unique violations (SQLSTATE `23505`) by constraint
    /// name; everything else stays an opaque database error.
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some("23505") {
                match db_err.constraint() {
                    Some(EMAIL_CONSTRAINT) => return StoreError::DuplicateEmail,
                    Some(TOKEN_HASH_CONSTRAINT) => return StoreError::DuplicateTokenHash,
                    _ => {}
                }
            }
        }
        StoreError::Database(err)
    }
}

/// Persistence operations required by the session manager.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn get_user_by_id(&self, id: DbId) -> Result<Option<User>, StoreError>;

    /// Insert a user and its first session atomically.
    async fn insert_user(
        &self,
        user: &CreateUser,
        session: &NewSession,
    ) -> Result<(User, UserSession), StoreError>;

    async fn update_user_password_hash(
        &self,
        id: DbId,
        password_hash: &str,
    ) -> Result<bool, StoreError>;

    /// Look up a session by token hash regardless of its state.
    async fn get_session_by_token_hash(
        &self,
        hash: &str,
    ) -> Result<Option<UserSession>, StoreError>;

    async fn insert_session(
        &self,
        user_id: DbId,
        session: &NewSession,
    ) -> Result<UserSession, StoreError>;

    /// Set `revoked_at` on a session that is not yet revoked. Returns whether
    /// a row changed.
    async fn update_session_revocation(
        &self,
        id: DbId,
        revoked_at: Timestamp,
    ) -> Result<bool, StoreError>;

    /// Revoke `old_id` and insert `replacement` for the same user in one
    /// atomic step. Returns `None` if `old_id` was already revoked or expired
    /// at `revoked_at`, in which case nothing is written.
    async fn rotate_session(
        &self,
        old_id: DbId,
        revoked_at: Timestamp,
        replacement: &NewSession,
    ) -> Result<Option<UserSession>, StoreError>;

    /// Revoke every active session owned by `user_id`.
    async fn revoke_all_sessions_for_user(
        &self,
        user_id: DbId,
        revoked_at: Timestamp,
    ) -> Result<u64, StoreError>;
}

/// [`CredentialStore`] backed by the Postgres repositories.
#[derive(Clone)]
pub struct PgCredentialStore {
    pool: DbPool,
}

impl PgCredentialStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(UserRepo::find_by_email(&self.pool, email).await?)
    }

    async fn get_user_by_id(&self, id: DbId) -> Result<Option<User>, StoreError> {
        Ok(UserRepo::find_by_id(&self.pool, id).await?)
    }

    async fn insert_user(
        &self,
        user: &CreateUser,
        session: &NewSession,
    ) -> Result<(User, UserSession), StoreError> {
        Ok(UserRepo::create_with_session(&self.pool, user, session).await?)
    }

    async fn update_user_password_hash(
        &self,
        id: DbId,
        password_hash: &str,
    ) -> Result<bool, StoreError> {
        Ok(UserRepo::update_password(&self.pool, id, password_hash).await?)
    }

    async fn get_session_by_token_hash(
        &self,
        hash: &str,
    ) -> Result<Option<UserSession>, StoreError> {
        Ok(SessionRepo::find_by_refresh_token_hash(&self.pool, hash).await?)
    }

    async fn insert_session(
        &self,
        user_id: DbId,
        session: &NewSession,
    ) -> Result<UserSession, StoreError> {
        Ok(SessionRepo::create(&self.pool, user_id, session).await?)
    }

    async fn update_session_revocation(
        &self,
        id: DbId,
        revoked_at: Timestamp,
    ) -> Result<bool, StoreError> {
        Ok(SessionRepo::revoke(&self.pool, id, revoked_at).await?)
    }

    async fn rotate_session(
        &self,
        old_id: DbId,
        revoked_at: Timestamp,
        replacement: &NewSession,
    ) -> Result<Option<UserSession>, StoreError> {
        Ok(SessionRepo::rotate(&self.pool, old_id, revoked_at, replacement).await?)
    }

    async fn revoke_all_sessions_for_user(
        &self,
        user_id: DbId,
        revoked_at: Timestamp,
    ) -> Result<u64, StoreError> {
        Ok(SessionRepo::revoke_all_for_user(&self.pool, user_id, revoked_at).await?)
    }
}
