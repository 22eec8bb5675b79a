//! Repository for the `user_details` table.

use formflow_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::user_details::{UpsertUserDetails, UserDetails};

const COLUMNS: &str = "\
    id, user_id, first_name, last_name, address, gender, id_proof, \
    education_details, pro_details, id_proof_upload, job_verification_doc, \
    created_at, updated_at";

/// Stores the answers a user gives to the onboarding steps.
pub struct UserDetailsRepo;

impl UserDetailsRepo {
    /// Insert the user's answers, or merge them into the existing row.
    ///
    /// Only the fields present in `input` overwrite stored values.
    pub async fn upsert(
        pool: &PgPool,
        user_id: DbId,
        input: &UpsertUserDetails,
    ) -> Result<UserDetails, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_details \
                (user_id, first_name, last_name, address, gender, id_proof, \
                 education_details, pro_details, id_proof_upload, job_verification_doc) \
             VALUES ($1, $2, $3, $4, $5, $6, \
                     COALESCE($7, '[]'::jsonb), COALESCE($8, '[]'::jsonb), $9, $10) \
             ON CONFLICT (user_id) DO UPDATE SET \
                first_name = COALESCE($2, user_details.first_name), \
                last_name = COALESCE($3, user_details.last_name), \
                address = COALESCE($4, user_details.address), \
                gender = COALESCE($5, user_details.gender), \
                id_proof = COALESCE($6, user_details.id_proof), \
                education_details = COALESCE($7, user_details.education_details), \
                pro_details = COALESCE($8, user_details.pro_details), \
                id_proof_upload = COALESCE($9, user_details.id_proof_upload), \
                job_verification_doc = COALESCE($10, user_details.job_verification_doc) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserDetails>(&query)
            .bind(user_id)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.address)
            .bind(&input.gender)
            .bind(&input.id_proof)
            .bind(input.education_details.as_ref().map(Json))
            .bind(input.pro_details.as_ref().map(Json))
            .bind(&input.id_proof_upload)
            .bind(&input.job_verification_doc)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_user_id(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<UserDetails>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM user_details WHERE user_id = $1");
        sqlx::query_as::<_, UserDetails>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }
}
