//! Submitted onboarding answers (`user_details`).

use formflow_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// One entry of the repeating education step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationDetail {
    #[serde(default)]
    pub education_type: Option<String>,
    #[serde(default)]
    pub name_institution: Option<String>,
    #[serde(default)]
    pub edu_grade: Option<String>,
}

/// One entry of the repeating professional step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProDetail {
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub designation: Option<String>,
}

/// A row from the `user_details` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserDetails {
    pub id: DbId,
    pub user_id: DbId,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub address: Option<String>,
    pub gender: Option<String>,
    pub id_proof: Option<String>,
    pub education_details: Json<Vec<EducationDetail>>,
    pub pro_details: Json<Vec<ProDetail>>,
    /// Storage key of the uploaded identity document.
    pub id_proof_upload: Option<String>,
    /// Storage key of the uploaded employment document.
    pub job_verification_doc: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for a partial upsert of a user's answers.
///
/// `None` leaves the stored value untouched; a list replaces the stored list.
#[derive(Debug, Clone, Default)]
pub struct UpsertUserDetails {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub address: Option<String>,
    pub gender: Option<String>,
    pub id_proof: Option<String>,
    pub education_details: Option<Vec<EducationDetail>>,
    pub pro_details: Option<Vec<ProDetail>>,
    pub id_proof_upload: Option<String>,
    pub job_verification_doc: Option<String>,
}
