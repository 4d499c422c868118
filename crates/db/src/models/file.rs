//! File entity model and DTOs.

use formdeck_core::types::Timestamp;
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// A file row from the `files` table, including its document.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct File {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub owner_id: Uuid,
    pub template_id: Uuid,
    pub is_public: bool,
    pub share_token: String,
    pub share_enabled: bool,
    pub document: Value,
    pub size_bytes: i64,
    pub last_opened_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Listing row without the document payload.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FileSummary {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub size_bytes: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a file from a template.
#[derive(Debug, Clone)]
pub struct CreateFile {
    pub code: String,
    pub name: String,
    pub owner_id: Uuid,
    pub template_id: Uuid,
    pub is_public: bool,
    pub share_token: String,
    pub document: Value,
    pub size_bytes: i64,
}
