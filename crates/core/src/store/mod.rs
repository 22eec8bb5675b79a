//! Storage port for flow and field-set versions.
//!
//! The engine talks to durable storage only through [`ConfigStore`]. Each
//! collection offers create, bulk-deactivate and filtered reads; documents
//! are never deleted.

pub mod memory;

pub use memory::InMemoryConfigStore;

use async_trait::async_trait;

use crate::versions::{FieldSetVersion, FlowVersion};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure reported by a storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("storage operation timed out")]
    Timeout,

    #[error("duplicate key: {0}")]
    Duplicate(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A failed publish, tagged with the storage operation that failed.
#[derive(Debug, thiserror::Error)]
#[error("{operation} failed: {source}")]
pub struct PublishFailure {
    pub operation: &'static str,
    #[source]
    pub source: StoreError,
}

impl PublishFailure {
    pub fn at(operation: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| Self { operation, source }
    }
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// Selects flow versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowFilter {
    /// Every version with `is_active = true`.
    Active,
}

impl FlowFilter {
    pub fn matches(&self, flow: &FlowVersion) -> bool {
        match self {
            Self::Active => flow.is_active,
        }
    }
}

/// Selects field-set versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSetFilter {
    /// Active versions of one scope.
    ActiveInScope(String),
    /// Active versions of any of the given scopes.
    ActiveInScopes(Vec<String>),
    /// Versions with the given ids, active or not.
    Ids(Vec<String>),
}

impl FieldSetFilter {
    pub fn matches(&self, field_set: &FieldSetVersion) -> bool {
        match self {
            Self::ActiveInScope(scope) => field_set.is_active && field_set.parent_id == *scope,
            Self::ActiveInScopes(scopes) => {
                field_set.is_active && scopes.iter().any(|s| *s == field_set.parent_id)
            }
            Self::Ids(ids) => ids.iter().any(|id| *id == field_set.config_id),
        }
    }
}

// ---------------------------------------------------------------------------
// Port
// ---------------------------------------------------------------------------

/// Durable storage for the flow and field-set collections.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Insert a new flow version.
    async fn create_flow(&self, flow: &FlowVersion) -> StoreResult<FlowVersion>;

    /// Set `is_active = false` on every flow version. Returns the rows touched.
    async fn deactivate_flows(&self) -> StoreResult<u64>;

    async fn find_flow_by_id(&self, flow_id: &str) -> StoreResult<Option<FlowVersion>>;

    async fn find_flows(&self, filter: &FlowFilter) -> StoreResult<Vec<FlowVersion>>;

    /// Insert a new field-set version.
    async fn create_field_set(&self, field_set: &FieldSetVersion) -> StoreResult<FieldSetVersion>;

    /// Set `is_active = false` on every field-set version of one scope.
    async fn deactivate_field_sets(&self, parent_id: &str) -> StoreResult<u64>;

    async fn find_field_set_by_id(&self, config_id: &str) -> StoreResult<Option<FieldSetVersion>>;

    async fn find_field_sets(&self, filter: &FieldSetFilter) -> StoreResult<Vec<FieldSetVersion>>;

    /// Deactivate all flow versions, then insert `flow` as the active one.
    ///
    /// The default runs the two steps as separate operations: a reader in
    /// between sees no active flow, and a failed insert leaves none active.
    /// Backends with multi-document transactions override this to make the
    /// swap atomic.
    async fn replace_active_flow(&self, flow: &FlowVersion) -> Result<FlowVersion, PublishFailure> {
        self.deactivate_flows()
            .await
            .map_err(PublishFailure::at("deactivate_flows"))?;
        self.create_flow(flow)
            .await
            .map_err(PublishFailure::at("create_flow"))
    }

    /// Deactivate the scope of `field_set`, then insert it as the active one.
    ///
    /// Same two-step default as [`ConfigStore::replace_active_flow`].
    async fn replace_active_field_set(
        &self,
        field_set: &FieldSetVersion,
    ) -> Result<FieldSetVersion, PublishFailure> {
        self.deactivate_field_sets(&field_set.parent_id)
            .await
            .map_err(PublishFailure::at("deactivate_field_sets"))?;
        self.create_field_set(field_set)
            .await
            .map_err(PublishFailure::at("create_field_set"))
    }
}
