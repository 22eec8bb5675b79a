pub mod form;
pub mod health;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /form/flows                      publish flow (POST)
/// /form/field-sets                 publish field-set (POST)
/// /form/config                     latest configuration (GET)
/// /form/fields?parent_id=          active field-set of one scope (GET)
///
/// /users                           create, pinning the snapshot (POST)
/// /users/{id}                      get
/// /users/{id}/form-config          configuration pinned to the user (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/form", form::router())
        .nest("/users", users::router())
}
