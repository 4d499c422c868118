//! Repository for the `templates` table.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::template::{CreateTemplate, Template, TemplateSummary};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, code, name, description, document, version, is_active, \
                       is_user_template, owner_id, visibility, created_by, created_at, updated_at";

/// Listing columns; the document payload is deliberately excluded.
const SUMMARY_COLUMNS: &str = "id, code, name, description, version, visibility, is_active, \
                               is_user_template, created_at, updated_at";

/// Provides read and seed operations for templates.
pub struct TemplateRepo;

impl TemplateRepo {
    /// Insert a new template, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateTemplate) -> Result<Template, sqlx::Error> {
        let query = format!(
            "INSERT INTO templates (code, name, description, document, version, is_active,
                                    is_user_template, owner_id, visibility, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Template>(&query)
            .bind(&input.code)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.document)
            .bind(input.version)
            .bind(input.is_active)
            .bind(input.is_user_template)
            .bind(input.owner_id)
            .bind(&input.visibility)
            .bind(input.created_by)
            .fetch_one(pool)
            .await
    }

    /// Find an active template by ID, document included.
    pub async fn find_active_by_id(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<Template>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM templates WHERE id = $1 AND is_active = TRUE");
        sqlx::query_as::<_, Template>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all active templates, most recently updated first. Admin view.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<TemplateSummary>, sqlx::Error> {
        let query = format!(
            "SELECT {SUMMARY_COLUMNS} FROM templates
             WHERE is_active = TRUE
             ORDER BY updated_at DESC"
        );
        sqlx::query_as::<_, TemplateSummary>(&query)
            .fetch_all(pool)
            .await
    }

    /// List active templates visible to a regular user: public or shared
    /// templates plus the user's own, most recently updated first.
    pub async fn list_visible_to(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<TemplateSummary>, sqlx::Error> {
        let query = format!(
            "SELECT {SUMMARY_COLUMNS} FROM templates
             WHERE is_active = TRUE
               AND (visibility IN ('public', 'shared') OR owner_id = $1)
             ORDER BY updated_at DESC"
        );
        sqlx::query_as::<_, TemplateSummary>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Total number of templates, active or not. Used by the seed check.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM templates")
            .fetch_one(pool)
            .await
    }
}
