//! User entity model and DTOs.

use formdeck_core::types::Timestamp;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A user row from the `users` table.
///
/// `password_hash` is `None` for Google-only accounts and is never
/// serialized into responses.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub google_sub: Option<String>,
    /// `local`, `google`, or `mixed` once a local account links Google.
    pub provider: String,
    pub is_admin: bool,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub last_login_at: Option<Timestamp>,
}

/// DTO for creating a new user (local registration or first Google sign-in).
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,
    pub password_hash: Option<String>,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub google_sub: Option<String>,
    pub provider: String,
}
