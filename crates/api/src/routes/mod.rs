pub mod auth;
pub mod files;
pub mod health;
pub mod templates;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                  register (public)
/// /auth/login                     login (public)
/// /auth/google                    Google sign-in (public)
/// /auth/me                        current user (requires auth)
///
/// /files                          list, create
/// /files/{id}                     get (by id or code), delete
/// /files/{id}/document            replace document (PUT)
/// /files/{id}/export              xlsx download (GET)
///
/// /templates                      list visible templates
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/files", files::router())
        .nest("/templates", templates::router())
}
