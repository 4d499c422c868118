//! Handlers for the `/templates` resource.

use axum::extract::State;
use axum::Json;
use formdeck_db::models::template::TemplateSummary;
use formdeck_db::repositories::TemplateRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// GET /api/v1/templates
///
/// Active templates visible to the caller, most recently updated first.
/// Administrators see every active template; everyone else sees public and
/// shared templates plus their own.
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<Vec<TemplateSummary>>> {
    let templates = if user.is_admin {
        TemplateRepo::list_active(&state.pool).await?
    } else {
        TemplateRepo::list_visible_to(&state.pool, user.user_id).await?
    };
    Ok(Json(templates))
}
