//! Handlers for the `/users` resource.
//!
//! Registration pins the configuration active at that moment; the user's
//! form config keeps resolving to it after later publishes. Answers to the
//! onboarding steps are stored per user under `/details`.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use formflow_core::error::CoreError;
use formflow_core::types::DbId;
use formflow_core::versions::ResolvedConfig;
use formflow_db::models::user::{CreateUser, User, UserResponse, ROLE_ADMIN};
use formflow_db::models::user_details::{
    EducationDetail, ProDetail, UpsertUserDetails, UserDetails,
};
use formflow_db::repositories::{UserDetailsRepo, UserRepo};
use serde::Deserialize;
use validator::Validate;

use super::validate_request;
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of `POST /users`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 1, max = 255, message = "name must be 1-255 characters"))]
    pub name: Option<String>,
}

/// Body of `PUT /users/{id}/details`. Every field is optional; empty strings
/// are stored as given.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserDetailsRequest {
    #[validate(length(max = 255))]
    pub first_name: Option<String>,
    #[validate(length(max = 255))]
    pub last_name: Option<String>,
    #[validate(length(max = 1000))]
    pub address: Option<String>,
    #[validate(length(max = 64))]
    pub gender: Option<String>,
    #[validate(length(max = 255))]
    pub id_proof: Option<String>,
    pub education_details: Option<Vec<EducationDetail>>,
    pub pro_details: Option<Vec<ProDetail>>,
    #[validate(length(max = 1024))]
    pub id_proof_upload: Option<String>,
    #[validate(length(max = 1024))]
    pub job_verification_doc: Option<String>,
}

impl From<UpdateUserDetailsRequest> for UpsertUserDetails {
    fn from(req: UpdateUserDetailsRequest) -> Self {
        Self {
            first_name: req.first_name,
            last_name: req.last_name,
            address: req.address,
            gender: req.gender,
            id_proof: req.id_proof,
            education_details: req.education_details,
            pro_details: req.pro_details,
            id_proof_upload: req.id_proof_upload,
            job_verification_doc: req.job_verification_doc,
        }
    }
}

/// POST /api/v1/users
///
/// Create a user and freeze the currently active configuration onto it.
/// Returns 409 if the email is taken.
pub async fn create_user(
    State(state): State<AppState>,
    body: Result<Json<CreateUserRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<DataResponse<UserResponse>>)> {
    let Json(input) = body?;
    validate_request(&input)?;

    if UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "User with email {} already exists",
            input.email
        ))));
    }

    let config = state.pinner.capture_snapshot().await?;
    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            email: input.email,
            name: input.name,
            role: ROLE_ADMIN,
            config,
        },
    )
    .await?;

    tracing::info!(
        user_id = user.id,
        flow_id = user.config_flow_id.as_deref(),
        "Created user with pinned configuration"
    );
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: UserResponse::from(user),
        }),
    ))
}

/// GET /api/v1/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = find_user(&state, id).await?;
    Ok(Json(DataResponse {
        data: UserResponse::from(user),
    }))
}

/// GET /api/v1/users/{id}/form-config
///
/// Resolve the configuration pinned at registration, falling back to the
/// latest for any half the snapshot left unset.
pub async fn get_user_form_config(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ResolvedConfig>>> {
    let user = find_user(&state, id).await?;
    let config = state.resolver.resolve_snapshot(&user.snapshot()).await?;
    Ok(Json(DataResponse { data: config }))
}

/// PUT /api/v1/users/{id}/details
///
/// Save the user's answers. Fields left out of the body keep their stored
/// values. Document fields take storage keys, not file contents.
pub async fn update_user_details(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    body: Result<Json<UpdateUserDetailsRequest>, JsonRejection>,
) -> AppResult<Json<DataResponse<UserDetails>>> {
    let Json(input) = body?;
    validate_request(&input)?;

    let user = find_user(&state, id).await?;
    let details = UserDetailsRepo::upsert(&state.pool, user.id, &input.into()).await?;

    tracing::info!(user_id = user.id, "Saved user details");
    Ok(Json(DataResponse { data: details }))
}

/// GET /api/v1/users/{id}/details
///
/// `data` is `null` until the user submits answers.
pub async fn get_user_details(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Option<UserDetails>>>> {
    let user = find_user(&state, id).await?;
    let details = UserDetailsRepo::find_by_user_id(&state.pool, user.id).await?;
    Ok(Json(DataResponse { data: details }))
}

async fn find_user(state: &AppState, id: DbId) -> AppResult<User> {
    UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: id.to_string(),
        }))
}
