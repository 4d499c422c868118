//! Repository for the `users` table.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::user::{CreateUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, email, password_hash, full_name, avatar_url, google_sub, provider, \
                       is_admin, is_active, created_at, updated_at, last_login_at";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (email, password_hash, full_name, avatar_url, google_sub, provider)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.full_name)
            .bind(&input.avatar_url)
            .bind(&input.google_sub)
            .bind(&input.provider)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email address.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by Google subject, falling back to email. Used during
    /// Google sign-in to match returning users and link local accounts.
    pub async fn find_by_google_sub_or_email(
        pool: &PgPool,
        google_sub: &str,
        email: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE google_sub = $1 OR email = $2");
        sqlx::query_as::<_, User>(&query)
            .bind(google_sub)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Stamp a successful login.
    pub async fn record_login(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET last_login_at = NOW(), updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Link a Google identity to an existing account.
    ///
    /// Fills `google_sub`, `full_name`, and `avatar_url` only where they are
    /// still empty, sets the provider, and stamps the login.
    pub async fn link_google(
        pool: &PgPool,
        id: Uuid,
        google_sub: &str,
        full_name: Option<&str>,
        avatar_url: Option<&str>,
        provider: &str,
    ) -> Result<User, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                google_sub = COALESCE(google_sub, $2),
                full_name = COALESCE(full_name, $3),
                avatar_url = COALESCE(avatar_url, $4),
                provider = $5,
                last_login_at = NOW(),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(google_sub)
            .bind(full_name)
            .bind(avatar_url)
            .bind(provider)
            .fetch_one(pool)
            .await
    }
}
