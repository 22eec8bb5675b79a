//! Handlers for the `/form` resource.
//!
//! Publishing goes through [`VersionPublisher`](formflow_core::publisher::VersionPublisher),
//! reads through [`ConfigResolver`](formflow_core::resolver::ConfigResolver).

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use formflow_core::fields::{FieldInput, OtherConfig};
use formflow_core::versions::{FieldSetVersion, FlowVersion, NewFieldSet, NewFlow, ResolvedConfig};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use super::validate_request;
use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// One step of a flow layout.
#[derive(Debug, Deserialize, Validate)]
pub struct FlowStepRequest {
    #[validate(length(min = 1, message = "form_id must not be empty"))]
    pub form_id: String,
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "description must not be empty"))]
    pub description: String,
    #[validate(length(min = 1, message = "theme must not be empty"))]
    pub theme: String,
}

/// Body of `POST /form/flows`. An empty step list is accepted.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateFlowRequest {
    #[validate(nested)]
    pub form_data: Vec<FlowStepRequest>,
}

/// Body of `POST /form/field-sets`. Field descriptors are checked by the publisher.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateFieldSetRequest {
    #[validate(length(min = 1, message = "parent_id must not be empty"))]
    pub parent_id: String,
    pub fields: Vec<FieldInput>,
    pub file_included: bool,
    pub other_config: OtherConfig,
}

#[derive(Debug, Deserialize, Validate)]
pub struct FieldsQuery {
    #[validate(length(min = 1, message = "parent_id must not be empty"))]
    pub parent_id: String,
}

/// POST /api/v1/form/flows
///
/// Publish a new flow layout; the previous flow is deactivated.
pub async fn create_flow(
    State(state): State<AppState>,
    body: Result<Json<CreateFlowRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<DataResponse<FlowVersion>>)> {
    let Json(input) = body?;
    validate_request(&input)?;

    let steps = input
        .form_data
        .into_iter()
        .map(|step| {
            json!({
                "form_id": step.form_id,
                "title": step.title,
                "description": step.description,
                "theme": step.theme,
            })
        })
        .collect();

    let flow = state
        .publisher
        .publish_flow(NewFlow {
            flow_id: None,
            steps,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: flow })))
}

/// POST /api/v1/form/field-sets
///
/// Publish a new field-set for one scope; only that scope is deactivated.
pub async fn create_field_set(
    State(state): State<AppState>,
    body: Result<Json<CreateFieldSetRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<DataResponse<FieldSetVersion>>)> {
    let Json(input) = body?;
    validate_request(&input)?;

    let field_set = state
        .publisher
        .publish_field_set(NewFieldSet {
            config_id: None,
            parent_id: input.parent_id,
            fields: input.fields,
            file_included: input.file_included,
            other_config: input.other_config,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: field_set })))
}

/// GET /api/v1/form/config
///
/// The currently active flow and default-scope field-sets.
pub async fn get_latest_config(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<ResolvedConfig>>> {
    let config = state.resolver.resolve_latest().await?;
    Ok(Json(DataResponse { data: config }))
}

/// GET /api/v1/form/fields?parent_id=
///
/// The active field-set of one scope; `data` is `null` when none is published.
pub async fn get_fields(
    State(state): State<AppState>,
    Query(query): Query<FieldsQuery>,
) -> AppResult<Json<DataResponse<Option<FieldSetVersion>>>> {
    validate_request(&query)?;
    let field_set = state
        .resolver
        .resolve_fields_by_parent(&query.parent_id)
        .await?;
    Ok(Json(DataResponse { data: field_set }))
}
