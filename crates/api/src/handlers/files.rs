//! Handlers for the `/files` resource: listing, instantiation from a
//! template, whole-document replacement, deletion, and spreadsheet export.

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::Response;
use axum::Json;
use formdeck_core::error::CoreError;
use formdeck_core::export::{emit_workbook, export_filename, FileExportMeta};
use formdeck_core::ids::{generate_file_code, generate_share_token};
use formdeck_core::instantiate::{build_file_document, document_size_bytes, TemplateIdentity};
use formdeck_db::models::file::{CreateFile, File, FileSummary};
use formdeck_db::repositories::{FileRepo, TemplateRepo};
use formdeck_db::DbPool;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Maximum accepted length of a file name.
const MAX_FILE_NAME_LENGTH: usize = 120;

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /files`.
#[derive(Debug, Deserialize)]
pub struct CreateFileRequest {
    pub name: String,
    pub template_id: Uuid,
    #[serde(default)]
    pub is_public: bool,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/files
///
/// The caller's files, most recently updated first.
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<Vec<FileSummary>>> {
    let files = FileRepo::list_by_owner(&state.pool, user.user_id).await?;
    Ok(Json(files))
}

/// POST /api/v1/files
///
/// Instantiate a new file from a template. The template must be active and
/// visible to the caller; its document is snapshotted together with the
/// template's identity, so later template edits never affect the file.
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateFileRequest>,
) -> AppResult<(StatusCode, Json<File>)> {
    let name = input.name.trim();
    if name.is_empty() || name.chars().count() > MAX_FILE_NAME_LENGTH {
        return Err(AppError::Core(CoreError::Validation(format!(
            "File name must be 1 to {MAX_FILE_NAME_LENGTH} characters"
        ))));
    }

    let template = TemplateRepo::find_active_by_id(&state.pool, input.template_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Template",
                id: input.template_id.to_string(),
            })
        })?;

    if !user.is_admin {
        let allowed = matches!(template.visibility.as_str(), "public" | "shared")
            || template.owner_id == Some(user.user_id);
        if !allowed {
            return Err(AppError::Core(CoreError::Forbidden(
                "Template is not available to this user".into(),
            )));
        }
    }

    let identity = TemplateIdentity {
        id: template.id,
        code: &template.code,
        version: template.version,
    };
    let document = build_file_document(&identity, &template.document);
    let size_bytes = document_size_bytes(&document)?;

    let code = unique_file_code(&state.pool).await?;
    let share_token = unique_share_token(&state.pool).await?;

    let create_dto = CreateFile {
        code,
        name: name.to_string(),
        owner_id: user.user_id,
        template_id: template.id,
        is_public: input.is_public,
        share_token,
        document,
        size_bytes,
    };
    let file = FileRepo::create(&state.pool, &create_dto).await?;
    tracing::info!(file_id = %file.id, code = %file.code, template_id = %template.id,
        "File instantiated from template");

    Ok((StatusCode::CREATED, Json(file)))
}

/// GET /api/v1/files/{id}
///
/// Fetch one file by UUID or by human code (UUID form is tried first).
/// Non-administrators only see their own files.
pub async fn get_by_id_or_code(
    State(state): State<AppState>,
    user: AuthUser,
    Path(reference): Path<String>,
) -> AppResult<Json<File>> {
    let file = resolve_visible_file(&state.pool, &user, &reference).await?;
    FileRepo::touch_last_opened(&state.pool, file.id).await?;
    Ok(Json(file))
}

/// PUT /api/v1/files/{id}/document
///
/// Replace the file's document wholesale and recompute its size. Accepts a
/// full `{template, data}` document or a bare data payload, which gets
/// wrapped as `{data: ...}`. Last writer wins; there is no version check.
pub async fn update_document(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<Value>,
) -> AppResult<Json<File>> {
    let file = FileRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| file_not_found(&id.to_string()))?;
    if !user.is_admin && file.owner_id != user.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the owner may modify this file".into(),
        )));
    }

    let document = normalize_document_payload(payload);
    let size_bytes = document_size_bytes(&document)?;

    let updated = FileRepo::update_document(&state.pool, id, &document, size_bytes)
        .await?
        .ok_or_else(|| file_not_found(&id.to_string()))?;
    Ok(Json(updated))
}

/// DELETE /api/v1/files/{id}
///
/// Permanently delete a file. Owner or administrator only.
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let file = FileRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| file_not_found(&id.to_string()))?;
    if !user.is_admin && file.owner_id != user.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the owner may delete this file".into(),
        )));
    }

    FileRepo::delete(&state.pool, id).await?;
    tracing::info!(file_id = %id, "File deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/files/{id}/export
///
/// Export the file as an xlsx attachment. A file whose document is missing
/// is rejected before any workbook construction.
pub async fn export(
    State(state): State<AppState>,
    user: AuthUser,
    Path(reference): Path<String>,
) -> AppResult<Response> {
    let file = resolve_visible_file(&state.pool, &user, &reference).await?;

    if file.document.is_null() {
        return Err(AppError::Core(CoreError::Validation(
            "File has no document to export".into(),
        )));
    }

    let meta = FileExportMeta {
        id: file.id.to_string(),
        code: file.code.clone(),
        name: file.name.clone(),
        created_at: file.created_at.to_rfc3339(),
        updated_at: file.updated_at.to_rfc3339(),
    };
    let bytes = emit_workbook(&meta, &file.document)?;
    let filename = export_filename(&file.code, &file.name);
    tracing::info!(file_id = %file.id, bytes = bytes.len(), "File exported");

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, XLSX_CONTENT_TYPE)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        )
        .body(axum::body::Body::from(bytes))
        .map_err(|e| AppError::InternalError(format!("Response construction failed: {e}")))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Resolve a file reference (UUID first, then human code) and enforce
/// visibility: a file owned by someone else is indistinguishable from a
/// missing one for non-administrators.
async fn resolve_visible_file(
    pool: &DbPool,
    user: &AuthUser,
    reference: &str,
) -> Result<File, AppError> {
    let mut file = None;
    if let Ok(id) = Uuid::parse_str(reference) {
        file = FileRepo::find_by_id(pool, id).await?;
    }
    if file.is_none() {
        file = FileRepo::find_by_code(pool, reference).await?;
    }

    file.filter(|f| user.is_admin || f.owner_id == user.user_id)
        .ok_or_else(|| file_not_found(reference))
}

fn file_not_found(reference: &str) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "File",
        id: reference.to_string(),
    })
}

/// A payload carrying both `template` and `data` is stored as-is; anything
/// else is treated as bare data and wrapped. An already-wrapped `{data}`
/// payload double-wraps here and is undone by the unwrapper on read.
fn normalize_document_payload(payload: Value) -> Value {
    let is_full_document = payload
        .as_object()
        .is_some_and(|obj| obj.contains_key("template") && obj.contains_key("data"));
    if is_full_document {
        payload
    } else {
        json!({ "data": payload })
    }
}

async fn unique_file_code(pool: &DbPool) -> Result<String, AppError> {
    loop {
        let code = generate_file_code();
        if !FileRepo::code_exists(pool, &code).await? {
            return Ok(code);
        }
    }
}

async fn unique_share_token(pool: &DbPool) -> Result<String, AppError> {
    loop {
        let token = generate_share_token();
        if !FileRepo::share_token_exists(pool, &token).await? {
            return Ok(token);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_document_payload_is_stored_as_is() {
        let payload = json!({"template": {"id": "t"}, "data": {"nodes": []}});
        assert_eq!(normalize_document_payload(payload.clone()), payload);
    }

    #[test]
    fn bare_data_payload_is_wrapped() {
        let payload = json!({"nodes": [{"id": "1"}]});
        assert_eq!(
            normalize_document_payload(payload.clone()),
            json!({"data": payload})
        );
    }

    #[test]
    fn array_payload_is_wrapped() {
        let payload = json!([1, 2, 3]);
        assert_eq!(
            normalize_document_payload(payload.clone()),
            json!({"data": payload})
        );
    }
}
