//! Repository for the `form_flows` table.

use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::flow_version::{CreateFlowVersion, FlowVersionRow};

const COLUMNS: &str = "id, flow_id, steps, is_active, created_at, updated_at";

const LOCK_KEY: &str = "form_flows";

/// Provides append-only access to flow versions.
pub struct FlowVersionRepo;

impl FlowVersionRepo {
    /// Insert a flow version as given, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateFlowVersion,
    ) -> Result<FlowVersionRow, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let row = Self::create_inner(&mut tx, input).await?;
        tx.commit().await?;
        Ok(row)
    }

    /// Clear `is_active` on every flow version. Returns the rows touched.
    pub async fn deactivate_all(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let touched = Self::deactivate_all_inner(&mut tx).await?;
        tx.commit().await?;
        Ok(touched)
    }

    /// Atomically deactivate the current flow and insert `input` as active.
    ///
    /// Concurrent publishers are serialized by a transaction-scoped advisory
    /// lock, so readers always see at most one active flow.
    pub async fn publish(
        pool: &PgPool,
        input: &CreateFlowVersion,
    ) -> Result<FlowVersionRow, sqlx::Error> {
        let mut tx = pool.begin().await?;
        super::lock_publish_scope(&mut tx, LOCK_KEY).await?;

        let deactivated = Self::deactivate_all_inner(&mut tx).await?;

        let row = Self::create_inner(
            &mut tx,
            &CreateFlowVersion {
                is_active: true,
                ..input.clone()
            },
        )
        .await?;
        tx.commit().await?;

        tracing::debug!(flow_id = %row.flow_id, deactivated, "Flow version swapped");
        Ok(row)
    }

    pub async fn find_by_flow_id(
        pool: &PgPool,
        flow_id: &str,
    ) -> Result<Option<FlowVersionRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM form_flows WHERE flow_id = $1");
        sqlx::query_as::<_, FlowVersionRow>(&query)
            .bind(flow_id)
            .fetch_optional(pool)
            .await
    }

    /// Active flow versions, oldest first. Normally zero or one.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<FlowVersionRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM form_flows WHERE is_active ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, FlowVersionRow>(&query)
            .fetch_all(pool)
            .await
    }

    /// Full publication history, newest first.
    pub async fn list_history(pool: &PgPool) -> Result<Vec<FlowVersionRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM form_flows ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, FlowVersionRow>(&query)
            .fetch_all(pool)
            .await
    }

    async fn deactivate_all_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE form_flows SET is_active = false WHERE is_active")
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected())
    }

    async fn create_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        input: &CreateFlowVersion,
    ) -> Result<FlowVersionRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO form_flows (flow_id, steps, is_active)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FlowVersionRow>(&query)
            .bind(&input.flow_id)
            .bind(Json(&input.steps))
            .bind(input.is_active)
            .fetch_one(&mut **tx)
            .await
    }
}
