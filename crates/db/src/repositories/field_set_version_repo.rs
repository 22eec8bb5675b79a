//! Repository for the `form_field_sets` table.

use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::field_set_version::{CreateFieldSetVersion, FieldSetVersionRow};

const COLUMNS: &str = "id, config_id, parent_id, fields, file_included, other_config, \
                       is_active, created_at, updated_at";

/// Provides append-only access to field-set versions.
pub struct FieldSetVersionRepo;

impl FieldSetVersionRepo {
    /// Insert a field-set version as given, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateFieldSetVersion,
    ) -> Result<FieldSetVersionRow, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let row = Self::create_inner(&mut tx, input).await?;
        tx.commit().await?;
        Ok(row)
    }

    /// Clear `is_active` on every version of one scope. Returns the rows touched.
    pub async fn deactivate_scope(pool: &PgPool, parent_id: &str) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let touched = Self::deactivate_scope_inner(&mut tx, parent_id).await?;
        tx.commit().await?;
        Ok(touched)
    }

    /// Atomically replace the active version of `input.parent_id`.
    ///
    /// Other scopes are untouched. Publishers of the same scope are
    /// serialized by an advisory lock keyed on the scope.
    pub async fn publish(
        pool: &PgPool,
        input: &CreateFieldSetVersion,
    ) -> Result<FieldSetVersionRow, sqlx::Error> {
        let mut tx = pool.begin().await?;
        super::lock_publish_scope(&mut tx, &format!("form_field_sets:{}", input.parent_id))
            .await?;

        let deactivated = Self::deactivate_scope_inner(&mut tx, &input.parent_id).await?;
        let row = Self::create_inner(
            &mut tx,
            &CreateFieldSetVersion {
                is_active: true,
                ..input.clone()
            },
        )
        .await?;
        tx.commit().await?;

        tracing::debug!(
            config_id = %row.config_id,
            parent_id = %row.parent_id,
            deactivated,
            "Field-set version swapped",
        );
        Ok(row)
    }

    pub async fn find_by_config_id(
        pool: &PgPool,
        config_id: &str,
    ) -> Result<Option<FieldSetVersionRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM form_field_sets WHERE config_id = $1");
        sqlx::query_as::<_, FieldSetVersionRow>(&query)
            .bind(config_id)
            .fetch_optional(pool)
            .await
    }

    /// Active versions of any of the given scopes, oldest first.
    pub async fn list_active_in_scopes(
        pool: &PgPool,
        parent_ids: &[String],
    ) -> Result<Vec<FieldSetVersionRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM form_field_sets \
             WHERE is_active AND parent_id = ANY($1) \
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, FieldSetVersionRow>(&query)
            .bind(parent_ids)
            .fetch_all(pool)
            .await
    }

    /// Versions with any of the given ids, active or not.
    pub async fn list_by_config_ids(
        pool: &PgPool,
        config_ids: &[String],
    ) -> Result<Vec<FieldSetVersionRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM form_field_sets WHERE config_id = ANY($1) \
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, FieldSetVersionRow>(&query)
            .bind(config_ids)
            .fetch_all(pool)
            .await
    }

    /// Publication history of one scope, newest first.
    pub async fn list_history(
        pool: &PgPool,
        parent_id: &str,
    ) -> Result<Vec<FieldSetVersionRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM form_field_sets WHERE parent_id = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, FieldSetVersionRow>(&query)
            .bind(parent_id)
            .fetch_all(pool)
            .await
    }

    async fn deactivate_scope_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        parent_id: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE form_field_sets SET is_active = false WHERE is_active AND parent_id = $1",
        )
        .bind(parent_id)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected())
    }

    async fn create_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        input: &CreateFieldSetVersion,
    ) -> Result<FieldSetVersionRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO form_field_sets
                (config_id, parent_id, fields, file_included, other_config, is_active)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FieldSetVersionRow>(&query)
            .bind(&input.config_id)
            .bind(&input.parent_id)
            .bind(Json(&input.fields))
            .bind(input.file_included)
            .bind(Json(&input.other_config))
            .bind(input.is_active)
            .fetch_one(&mut **tx)
            .await
    }
}
