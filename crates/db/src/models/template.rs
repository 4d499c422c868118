//! Template entity model and DTOs.

use formdeck_core::types::Timestamp;
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// A template row from the `templates` table, including its document.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Template {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub document: Value,
    pub version: i32,
    pub is_active: bool,
    pub is_user_template: bool,
    pub owner_id: Option<Uuid>,
    pub visibility: String,
    pub created_by: Option<Uuid>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Listing row without the document payload.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TemplateSummary {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub version: i32,
    pub visibility: String,
    pub is_active: bool,
    pub is_user_template: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a template (seed and admin tooling).
#[derive(Debug, Clone)]
pub struct CreateTemplate {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub document: Value,
    pub version: i32,
    pub is_active: bool,
    pub is_user_template: bool,
    pub owner_id: Option<Uuid>,
    pub visibility: String,
    pub created_by: Option<Uuid>,
}
