//! [`ConfigStore`] implementation over the PostgreSQL repositories.
//!
//! Publishing overrides the two-step default with a single transaction, so
//! the deactivate and the insert commit or roll back together.

use async_trait::async_trait;
use formflow_core::store::{
    ConfigStore, FieldSetFilter, FlowFilter, PublishFailure, StoreError, StoreResult,
};
use formflow_core::versions::{FieldSetVersion, FlowVersion};

use crate::models::field_set_version::CreateFieldSetVersion;
use crate::models::flow_version::CreateFlowVersion;
use crate::repositories::{FieldSetVersionRepo, FlowVersionRepo};
use crate::DbPool;

/// Postgres-backed configuration store.
#[derive(Debug, Clone)]
pub struct PgConfigStore {
    pool: DbPool,
}

impl PgConfigStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Translate a driver error into the storage port's error type.
pub fn store_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::PoolTimedOut => StoreError::Timeout,
        sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
            // query_canceled, raised when statement_timeout fires
            Some("57014") => StoreError::Timeout,
            Some("23505") => StoreError::Duplicate(
                db_err
                    .constraint()
                    .map(str::to_string)
                    .unwrap_or_else(|| db_err.message().to_string()),
            ),
            _ => StoreError::Backend(err.to_string()),
        },
        _ => StoreError::Backend(err.to_string()),
    }
}

#[async_trait]
impl ConfigStore for PgConfigStore {
    async fn create_flow(&self, flow: &FlowVersion) -> StoreResult<FlowVersion> {
        FlowVersionRepo::create(&self.pool, &CreateFlowVersion::from(flow))
            .await
            .map(FlowVersion::from)
            .map_err(store_error)
    }

    async fn deactivate_flows(&self) -> StoreResult<u64> {
        FlowVersionRepo::deactivate_all(&self.pool)
            .await
            .map_err(store_error)
    }

    async fn find_flow_by_id(&self, flow_id: &str) -> StoreResult<Option<FlowVersion>> {
        let row = FlowVersionRepo::find_by_flow_id(&self.pool, flow_id)
            .await
            .map_err(store_error)?;
        Ok(row.map(FlowVersion::from))
    }

    async fn find_flows(&self, filter: &FlowFilter) -> StoreResult<Vec<FlowVersion>> {
        let rows = match filter {
            FlowFilter::Active => FlowVersionRepo::list_active(&self.pool).await,
        }
        .map_err(store_error)?;
        Ok(rows.into_iter().map(FlowVersion::from).collect())
    }

    async fn create_field_set(&self, field_set: &FieldSetVersion) -> StoreResult<FieldSetVersion> {
        FieldSetVersionRepo::create(&self.pool, &CreateFieldSetVersion::from(field_set))
            .await
            .map(FieldSetVersion::from)
            .map_err(store_error)
    }

    async fn deactivate_field_sets(&self, parent_id: &str) -> StoreResult<u64> {
        FieldSetVersionRepo::deactivate_scope(&self.pool, parent_id)
            .await
            .map_err(store_error)
    }

    async fn find_field_set_by_id(&self, config_id: &str) -> StoreResult<Option<FieldSetVersion>> {
        let row = FieldSetVersionRepo::find_by_config_id(&self.pool, config_id)
            .await
            .map_err(store_error)?;
        Ok(row.map(FieldSetVersion::from))
    }

    async fn find_field_sets(&self, filter: &FieldSetFilter) -> StoreResult<Vec<FieldSetVersion>> {
        let rows = match filter {
            FieldSetFilter::ActiveInScope(scope) => {
                FieldSetVersionRepo::list_active_in_scopes(
                    &self.pool,
                    std::slice::from_ref(scope),
                )
                .await
            }
            FieldSetFilter::ActiveInScopes(scopes) => {
                FieldSetVersionRepo::list_active_in_scopes(&self.pool, scopes).await
            }
            FieldSetFilter::Ids(ids) => {
                FieldSetVersionRepo::list_by_config_ids(&self.pool, ids).await
            }
        }
        .map_err(store_error)?;
        Ok(rows.into_iter().map(FieldSetVersion::from).collect())
    }

    async fn replace_active_flow(&self, flow: &FlowVersion) -> Result<FlowVersion, PublishFailure> {
        FlowVersionRepo::publish(&self.pool, &CreateFlowVersion::from(flow))
            .await
            .map(FlowVersion::from)
            .map_err(|err| PublishFailure::at("publish_flow")(store_error(err)))
    }

    async fn replace_active_field_set(
        &self,
        field_set: &FieldSetVersion,
    ) -> Result<FieldSetVersion, PublishFailure> {
        FieldSetVersionRepo::publish(&self.pool, &CreateFieldSetVersion::from(field_set))
            .await
            .map(FieldSetVersion::from)
            .map_err(|err| PublishFailure::at("publish_field_set")(store_error(err)))
    }
}
