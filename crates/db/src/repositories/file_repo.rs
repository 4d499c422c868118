//! Repository for the `files` table.

use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::file::{CreateFile, File, FileSummary};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, code, name, owner_id, template_id, is_public, share_token, \
                       share_enabled, document, size_bytes, last_opened_at, created_at, \
                       updated_at";

/// Listing columns; the document payload is deliberately excluded.
const SUMMARY_COLUMNS: &str = "id, code, name, size_bytes, created_at, updated_at";

/// Provides CRUD operations for files.
pub struct FileRepo;

impl FileRepo {
    /// Insert a new file, returning the created row. Sharing is enabled by
    /// default; the unique constraints on `code` and `share_token` are the
    /// concurrency backstop for the caller's generate-and-check loop.
    pub async fn create(pool: &PgPool, input: &CreateFile) -> Result<File, sqlx::Error> {
        let query = format!(
            "INSERT INTO files (code, name, owner_id, template_id, is_public, share_token,
                                share_enabled, document, size_bytes)
             VALUES ($1, $2, $3, $4, $5, $6, TRUE, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, File>(&query)
            .bind(&input.code)
            .bind(&input.name)
            .bind(input.owner_id)
            .bind(input.template_id)
            .bind(input.is_public)
            .bind(&input.share_token)
            .bind(&input.document)
            .bind(input.size_bytes)
            .fetch_one(pool)
            .await
    }

    /// List a user's files, most recently updated first.
    pub async fn list_by_owner(
        pool: &PgPool,
        owner_id: Uuid,
    ) -> Result<Vec<FileSummary>, sqlx::Error> {
        let query = format!(
            "SELECT {SUMMARY_COLUMNS} FROM files WHERE owner_id = $1 ORDER BY updated_at DESC"
        );
        sqlx::query_as::<_, FileSummary>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    /// Find a file by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<File>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM files WHERE id = $1");
        sqlx::query_as::<_, File>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a file by its human code.
    pub async fn find_by_code(pool: &PgPool, code: &str) -> Result<Option<File>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM files WHERE code = $1");
        sqlx::query_as::<_, File>(&query)
            .bind(code)
            .fetch_optional(pool)
            .await
    }

    /// Whether a human code is already taken.
    pub async fn code_exists(pool: &PgPool, code: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM files WHERE code = $1)")
            .bind(code)
            .fetch_one(pool)
            .await
    }

    /// Whether a sharing token is already taken.
    pub async fn share_token_exists(pool: &PgPool, token: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM files WHERE share_token = $1)")
            .bind(token)
            .fetch_one(pool)
            .await
    }

    /// Replace a file's document wholesale and record the new size.
    ///
    /// Returns `None` if no row with the given `id` exists. Last writer wins;
    /// there is no version check.
    pub async fn update_document(
        pool: &PgPool,
        id: Uuid,
        document: &Value,
        size_bytes: i64,
    ) -> Result<Option<File>, sqlx::Error> {
        let query = format!(
            "UPDATE files SET document = $2, size_bytes = $3, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, File>(&query)
            .bind(id)
            .bind(document)
            .bind(size_bytes)
            .fetch_optional(pool)
            .await
    }

    /// Stamp the last time a file was opened.
    pub async fn touch_last_opened(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE files SET last_opened_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Permanently delete a file by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
