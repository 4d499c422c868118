//! Route definitions for the `/files` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::files;
use crate::state::AppState;

/// Routes mounted at `/files`.
///
/// ```text
/// GET    /                 -> list
/// POST   /                 -> create
/// GET    /{id}             -> get_by_id_or_code (UUID or human code)
/// DELETE /{id}             -> delete
/// PUT    /{id}/document    -> update_document
/// GET    /{id}/export      -> export
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(files::list).post(files::create))
        .route(
            "/{id}",
            get(files::get_by_id_or_code).delete(files::delete),
        )
        .route("/{id}/document", put(files::update_document))
        .route("/{id}/export", get(files::export))
}
