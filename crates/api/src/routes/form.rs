//! Route definitions for form configuration publishing and resolution.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::form;
use crate::state::AppState;

/// Routes mounted at `/form`.
///
/// ```text
/// POST /flows        -> create_flow
/// POST /field-sets   -> create_field_set
/// GET  /config       -> get_latest_config
/// GET  /fields       -> get_fields
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/flows", post(form::create_flow))
        .route("/field-sets", post(form::create_field_set))
        .route("/config", get(form::get_latest_config))
        .route("/fields", get(form::get_fields))
}
