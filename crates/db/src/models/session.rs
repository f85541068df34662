//! Refresh-token session model and DTOs.

use sqlx::FromRow;
use staybook_core::types::{DbId, Timestamp};

/// A session row from the `user_sessions` table.
///
/// Only the keyed hash of the refresh token is stored. A session is never
/// deleted; it ends either by setting `revoked_at` or by passing `expires_at`.
#[derive(Debug, Clone, FromRow)]
pub struct UserSession {
    pub id: DbId,
    pub user_id: DbId,
    pub refresh_token_hash: String,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
    pub revoked_at: Option<Timestamp>,
}

impl UserSession {
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expires_at <= now
    }

    /// Active iff not revoked and `expires_at` is still in the future.
    pub fn is_active(&self, now: Timestamp) -> bool {
        !self.is_revoked() && !self.is_expired(now)
    }
}

/// DTO for inserting a session. The owning user id is passed separately so
/// the same DTO works for registration, where the user row does not exist yet.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub refresh_token_hash: String,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    fn session(expires_in: Duration, revoked: bool) -> UserSession {
        let now = Utc::now();
        UserSession {
            id: 1,
            user_id: 1,
            refresh_token_hash: "h".into(),
            user_agent: None,
            ip_address: None,
            created_at: now,
            expires_at: now + expires_in,
            revoked_at: revoked.then_some(now),
        }
    }

    #[test]
    fn fresh_session_is_active() {
        let s = session(Duration::days(1), false);
        assert!(s.is_active(Utc::now()));
    }

    #[test]
    fn revoked_session_is_not_active() {
        let s = session(Duration::days(1), true);
        assert!(s.is_revoked());
        assert!(!s.is_active(Utc::now()));
    }

    #[test]
    fn expiry_boundary_counts_as_expired() {
        let s = session(Duration::days(1), false);
        assert!(s.is_expired(s.expires_at));
        assert!(!s.is_expired(s.expires_at - Duration::seconds(1)));
    }
}
