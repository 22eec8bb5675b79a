use axum::routing::{get, post};
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// POST /                  -> create_user
/// GET  /{id}              -> get_user
/// GET  /{id}/form-config  -> get_user_form_config
/// GET  /{id}/details      -> get_user_details
/// PUT  /{id}/details      -> update_user_details
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(users::create_user))
        .route("/{id}", get(users::get_user))
        .route("/{id}/form-config", get(users::get_user_form_config))
        .route(
            "/{id}/details",
            get(users::get_user_details).put(users::update_user_details),
        )
}
