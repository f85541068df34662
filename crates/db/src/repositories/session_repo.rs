//! Repository for the `user_sessions` table.
//!
//! Revocation is always conditional on `revoked_at IS NULL`, so two writers
//! racing on the same row cannot both observe a successful revoke: under
//! Postgres row locking the second `UPDATE` re-evaluates its predicate after
//! the first commits and matches zero rows.

use sqlx::{PgPool, Postgres, Transaction};
use staybook_core::types::{DbId, Timestamp};

use crate::models::session::{NewSession, UserSession};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, refresh_token_hash, user_agent, ip_address, \
                        created_at, expires_at, revoked_at";

/// Provides CRUD operations for refresh sessions.
pub struct SessionRepo;

impl SessionRepo {
    /// Insert a new session for `user_id`, returning the created row.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &NewSession,
    ) -> Result<UserSession, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let session = Self::insert_inner(&mut tx, user_id, input).await?;
        tx.commit().await?;
        Ok(session)
    }

    /// Find a session by its refresh token hash, whatever its state.
    ///
    /// Callers distinguish revoked and expired sessions themselves.
    pub async fn find_by_refresh_token_hash(
        pool: &PgPool,
        hash: &str,
    ) -> Result<Option<UserSession>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM user_sessions WHERE refresh_token_hash = $1");
        sqlx::query_as::<_, UserSession>(&query)
            .bind(hash)
            .fetch_optional(pool)
            .await
    }

    /// Revoke a single session at `at`. Returns `true` if the row was updated,
    /// `false` if it was already revoked or does not exist.
    pub async fn revoke(pool: &PgPool, id: DbId, at: Timestamp) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE user_sessions SET revoked_at = $2 WHERE id = $1 AND revoked_at IS NULL",
        )
        .bind(id)
        .bind(at)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Revoke session `old_id` and insert its replacement in one transaction.
    ///
    /// Returns `None` (and writes nothing) if the old session was already
    /// revoked or had expired by `at`.
    pub async fn rotate(
        pool: &PgPool,
        old_id: DbId,
        at: Timestamp,
        replacement: &NewSession,
    ) -> Result<Option<UserSession>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let revoked: Option<(DbId,)> = sqlx::query_as(
            "UPDATE user_sessions SET revoked_at = $2
             WHERE id = $1 AND revoked_at IS NULL AND expires_at > $2
             RETURNING user_id",
        )
        .bind(old_id)
        .bind(at)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((user_id,)) = revoked else {
            tx.rollback().await?;
            return Ok(None);
        };

        let session = Self::insert_inner(&mut tx, user_id, replacement).await?;
        tx.commit().await?;
        Ok(Some(session))
    }

    /// Revoke all active sessions for a user. Returns the count of revoked sessions.
    pub async fn revoke_all_for_user(
        pool: &PgPool,
        user_id: DbId,
        at: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE user_sessions SET revoked_at = $2
             WHERE user_id = $1 AND revoked_at IS NULL AND expires_at > $2",
        )
        .bind(user_id)
        .bind(at)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub(crate) async fn insert_inner(
        tx: &mut Transaction<'_, Postgres>,
        user_id: DbId,
        input: &NewSession,
    ) -> Result<UserSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_sessions
                (user_id, refresh_token_hash, user_agent, ip_address, created_at, expires_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserSession>(&query)
            .bind(user_id)
            .bind(&input.refresh_token_hash)
            .bind(&input.user_agent)
            .bind(&input.ip_address)
            .bind(input.created_at)
            .bind(input.expires_at)
            .fetch_one(&mut **tx)
            .await
    }
}
