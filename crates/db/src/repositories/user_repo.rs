//! Repository for the `users` table.

use sqlx::{PgPool, Postgres, Transaction};
use staybook_core::types::DbId;

use crate::models::session::{NewSession, UserSession};
use crate::models::user::{CreateUser, User};
use crate::repositories::SessionRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, role, name, email, password_hash, phone, created_at, updated_at";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let user = Self::insert_inner(&mut tx, input).await?;
        tx.commit().await?;
        Ok(user)
    }

    /// Insert a new user together with its first refresh session.
    ///
    /// Both rows are committed in one transaction: a failure on either insert
    /// (including the unique constraint on `email`) leaves no user behind.
    pub async fn create_with_session(
        pool: &PgPool,
        input: &CreateUser,
        session: &NewSession,
    ) -> Result<(User, UserSession), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let user = Self::insert_inner(&mut tx, input).await?;
        let session = SessionRepo::insert_inner(&mut tx, user.id, session).await?;

        tx.commit().await?;
        Ok((user, session))
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email (case-sensitive).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Update a user's password hash. Returns `true` if the row was updated.
    pub async fn update_password(
        pool: &PgPool,
        id: DbId,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_inner(
        tx: &mut Transaction<'_, Postgres>,
        input: &CreateUser,
    ) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (role, name, email, password_hash, phone, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(input.role.as_str())
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.phone)
            .bind(input.created_at)
            .fetch_one(&mut **tx)
            .await
    }
}
