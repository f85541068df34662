//! Session and credential lifecycle: register, login, refresh, logout.
//!
//! A refresh session moves `ACTIVE -> REVOKED` (logout, or superseded by
//! rotation) or `ACTIVE -> EXPIRED` (derived from `expires_at`); both are
//! terminal. Every refresh is a strict one-hop rotation: the presented session
//! is revoked and a brand-new one is issued in the same store transaction, so
//! each raw refresh token is single-use. Rotated-away tokens do not revoke
//! their descendants when replayed (no token-family tracking).

use std::sync::Arc;

use staybook_core::clock::Clock;
use staybook_core::error::AuthError;
use staybook_core::roles::Role;
use staybook_core::types::{DbId, Timestamp};
use staybook_db::models::session::NewSession;
use staybook_db::models::user::{CreateUser, User};

use super::jwt::{generate_access_token, validate_token, Claims, JwtConfig};
use super::password::{self, PasswordConfig};
use super::refresh::{generate_refresh_token, hash_refresh_token};
use super::store::{CredentialStore, StoreError};
use crate::error::{AppError, AppResult};
use crate::middleware::client::ClientMeta;

/// Input for [`SessionManager::register`].
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub role: Role,
}

/// Result of a successful register, login, or refresh.
///
/// `refresh_token` is the raw token; it must only leave the server inside the
/// refresh cookie.
#[derive(Debug)]
pub struct IssuedSession {
    pub access_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub refresh_token: String,
    pub user: User,
}

/// Issues, rotates, and revokes sessions against a [`CredentialStore`].
///
/// Constructed once at startup and shared through `AppState`; the signing
/// secret and pepper live in the injected [`JwtConfig`].
pub struct SessionManager {
    store: Arc<dyn CredentialStore>,
    clock: Arc<dyn Clock>,
    jwt: JwtConfig,
    password: PasswordConfig,
}

impl SessionManager {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        clock: Arc<dyn Clock>,
        jwt: JwtConfig,
        password: PasswordConfig,
    ) -> Self {
        Self {
            store,
            clock,
            jwt,
            password,
        }
    }

    /// Refresh cookie `Max-Age`, equal to the session lifetime.
    pub fn refresh_cookie_max_age_secs(&self) -> i64 {
        self.jwt.refresh_token_ttl().num_seconds()
    }

    /// Create a user and its first session in one transaction.
    pub async fn register(
        &self,
        input: RegisterInput,
        meta: &ClientMeta,
    ) -> AppResult<IssuedSession> {
        let password_hash = self.hash_password(input.password).await?;
        let now = self.clock.now();
        let (refresh_token, new_session) = self.new_session(meta, now);

        let create = CreateUser {
            name: input.name,
            email: input.email,
            password_hash,
            phone: input.phone,
            role: input.role,
            created_at: now,
        };

        let (user, session) = self
            .store
            .insert_user(&create, &new_session)
            .await
            .map_err(|e| match e {
                StoreError::DuplicateEmail => AppError::Auth(AuthError::EmailAlreadyRegistered),
                other => AppError::Store(other),
            })?;

        tracing::info!(
            user_id = user.id,
            session_id = session.id,
            role = %user.role,
            "User registered"
        );
        self.issue(user, refresh_token, now)
    }

    /// Authenticate by email and password and open a new session.
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        meta: &ClientMeta,
    ) -> AppResult<IssuedSession> {
        let user = self
            .store
            .get_user_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self.verify_password(password, &user.password_hash).await? {
            tracing::info!(user_id = user.id, "Login rejected: wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        self.upgrade_password_hash(&user, password).await;

        let now = self.clock.now();
        let (refresh_token, new_session) = self.new_session(meta, now);
        let session = self.store.insert_session(user.id, &new_session).await?;

        tracing::info!(user_id = user.id, session_id = session.id, "User logged in");
        self.issue(user, refresh_token, now)
    }

    /// Exchange a refresh token for a new access token and a rotated refresh
    /// token.
    pub async fn refresh(
        &self,
        raw_token: Option<&str>,
        meta: &ClientMeta,
    ) -> AppResult<IssuedSession> {
        let raw_token = raw_token.ok_or(AuthError::TokenMissing)?;
        let token_hash = hash_refresh_token(raw_token, &self.jwt.refresh_token_pepper);

        let session = self
            .store
            .get_session_by_token_hash(&token_hash)
            .await?
            .ok_or(AuthError::TokenInvalid)?;

        let now = self.clock.now();
        if session.is_revoked() {
            tracing::warn!(
                session_id = session.id,
                user_id = session.user_id,
                "Refresh with revoked token rejected"
            );
            return Err(AuthError::TokenRevoked.into());
        }
        if session.is_expired(now) {
            return Err(AuthError::TokenExpired.into());
        }

        let user = self
            .store
            .get_user_by_id(session.user_id)
            .await?
            .ok_or(AuthError::PrincipalNotFound)?;

        let (refresh_token, replacement) = self.new_session(meta, now);
        let Some(new_session) = self
            .store
            .rotate_session(session.id, now, &replacement)
            .await?
        else {
            // Another request rotated or revoked this session between our
            // read and the conditional update.
            tracing::warn!(
                session_id = session.id,
                user_id = user.id,
                "Lost concurrent refresh race"
            );
            return Err(AuthError::TokenRevoked.into());
        };

        tracing::debug!(
            user_id = user.id,
            old_session_id = session.id,
            new_session_id = new_session.id,
            "Refresh session rotated"
        );
        self.issue(user, refresh_token, now)
    }

    /// Revoke the session behind `raw_token`, if any.
    ///
    /// Idempotent: a missing, unknown, or already revoked token is a no-op.
    pub async fn logout(&self, raw_token: Option<&str>) -> AppResult<()> {
        let Some(raw_token) = raw_token else {
            return Ok(());
        };
        let token_hash = hash_refresh_token(raw_token, &self.jwt.refresh_token_pepper);

        if let Some(session) = self.store.get_session_by_token_hash(&token_hash).await? {
            if !session.is_revoked()
                && self
                    .store
                    .update_session_revocation(session.id, self.clock.now())
                    .await?
            {
                tracing::info!(
                    user_id = session.user_id,
                    session_id = session.id,
                    "Session revoked on logout"
                );
            }
        }
        Ok(())
    }

    /// Revoke every active session of `user_id`. Returns how many were revoked.
    pub async fn logout_all(&self, user_id: DbId) -> AppResult<u64> {
        let revoked = self
            .store
            .revoke_all_sessions_for_user(user_id, self.clock.now())
            .await?;
        tracing::info!(user_id, revoked, "All sessions revoked");
        Ok(revoked)
    }

    /// Stateless access-token check against the injected clock.
    pub fn verify_access_token(&self, token: &str) -> Result<Claims, AuthError> {
        validate_token(token, &self.jwt, self.clock.now())
    }

    /// Verify an access token and confirm its subject still exists.
    pub async fn resolve_principal(&self, token: &str) -> AppResult<User> {
        let claims = self.verify_access_token(token)?;
        self.load_principal(claims.sub).await
    }

    /// Load the user behind an already-verified token subject.
    pub async fn load_principal(&self, user_id: DbId) -> AppResult<User> {
        Ok(self
            .store
            .get_user_by_id(user_id)
            .await?
            .ok_or(AuthError::PrincipalNotFound)?)
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn issue(&self, user: User, refresh_token: String, now: Timestamp) -> AppResult<IssuedSession> {
        let access_token = generate_access_token(user.id, user.role, &self.jwt, now)
            .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

        Ok(IssuedSession {
            access_token,
            expires_in: self.jwt.access_token_ttl_secs(),
            refresh_token,
            user,
        })
    }

    fn new_session(&self, meta: &ClientMeta, now: Timestamp) -> (String, NewSession) {
        let (plaintext, hash) = generate_refresh_token(&self.jwt.refresh_token_pepper);
        let session = NewSession {
            refresh_token_hash: hash,
            user_agent: meta.user_agent.clone(),
            ip_address: meta.ip_address.clone(),
            created_at: now,
            expires_at: now + self.jwt.refresh_token_ttl(),
        };
        (plaintext, session)
    }

    async fn hash_password(&self, password: String) -> AppResult<String> {
        let config = self.password.clone();
        tokio::task::spawn_blocking(move || password::hash_password(&password, &config))
            .await
            .map_err(|e| AppError::InternalError(format!("Password hashing task failed: {e}")))?
            .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))
    }

    async fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        let password = password.to_string();
        let hash = hash.to_string();
        tokio::task::spawn_blocking(move || password::verify_password(&password, &hash))
            .await
            .map_err(|e| AppError::InternalError(format!("Password verification task failed: {e}")))?
            .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))
    }

    /// Re-hash with the current cost factors if the stored hash is outdated.
    /// Failures are logged; the login itself has already succeeded.
    async fn upgrade_password_hash(&self, user: &User, password: &str) {
        match password::needs_rehash(&user.password_hash, &self.password) {
            Ok(false) => return,
            Ok(true) => {}
            Err(e) => {
                tracing::warn!(user_id = user.id, error = %e, "Could not inspect password hash");
                return;
            }
        }

        let result = match self.hash_password(password.to_string()).await {
            Ok(new_hash) => self
                .store
                .update_user_password_hash(user.id, &new_hash)
                .await
                .map_err(AppError::from),
            Err(e) => Err(e),
        };
        match result {
            Ok(_) => tracing::info!(user_id = user.id, "Password hash upgraded"),
            Err(e) => tracing::warn!(user_id = user.id, error = %e, "Password hash upgrade failed"),
        }
    }
}
