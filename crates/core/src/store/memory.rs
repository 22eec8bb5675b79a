//! In-memory [`ConfigStore`] backed by insertion-ordered vectors.
//!
//! Used by unit tests and for running the engine without a database. Each
//! call takes the lock once, so publishes go through the non-atomic default
//! `replace_active_*` path.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{ConfigStore, FieldSetFilter, FlowFilter, StoreError, StoreResult};
use crate::versions::{FieldSetVersion, FlowVersion};

#[derive(Debug, Default)]
pub struct InMemoryConfigStore {
    flows: RwLock<Vec<FlowVersion>>,
    field_sets: RwLock<Vec<FieldSetVersion>>,
}

impl InMemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored flow version, oldest first.
    pub async fn all_flows(&self) -> Vec<FlowVersion> {
        self.flows.read().await.clone()
    }

    /// Every stored field-set version, oldest first.
    pub async fn all_field_sets(&self) -> Vec<FieldSetVersion> {
        self.field_sets.read().await.clone()
    }
}

#[async_trait]
impl ConfigStore for InMemoryConfigStore {
    async fn create_flow(&self, flow: &FlowVersion) -> StoreResult<FlowVersion> {
        let mut flows = self.flows.write().await;
        if flows.iter().any(|f| f.flow_id == flow.flow_id) {
            return Err(StoreError::Duplicate(format!("flow_id {}", flow.flow_id)));
        }
        flows.push(flow.clone());
        Ok(flow.clone())
    }

    async fn deactivate_flows(&self) -> StoreResult<u64> {
        let mut flows = self.flows.write().await;
        let now = Utc::now();
        let mut touched = 0;
        for flow in flows.iter_mut().filter(|f| f.is_active) {
            flow.is_active = false;
            flow.updated_at = now;
            touched += 1;
        }
        Ok(touched)
    }

    async fn find_flow_by_id(&self, flow_id: &str) -> StoreResult<Option<FlowVersion>> {
        let flows = self.flows.read().await;
        Ok(flows.iter().find(|f| f.flow_id == flow_id).cloned())
    }

    async fn find_flows(&self, filter: &FlowFilter) -> StoreResult<Vec<FlowVersion>> {
        let flows = self.flows.read().await;
        Ok(flows.iter().filter(|f| filter.matches(f)).cloned().collect())
    }

    async fn create_field_set(&self, field_set: &FieldSetVersion) -> StoreResult<FieldSetVersion> {
        let mut field_sets = self.field_sets.write().await;
        if field_sets.iter().any(|fs| fs.config_id == field_set.config_id) {
            return Err(StoreError::Duplicate(format!(
                "config_id {}",
                field_set.config_id
            )));
        }
        field_sets.push(field_set.clone());
        Ok(field_set.clone())
    }

    async fn deactivate_field_sets(&self, parent_id: &str) -> StoreResult<u64> {
        let mut field_sets = self.field_sets.write().await;
        let now = Utc::now();
        let mut touched = 0;
        for field_set in field_sets
            .iter_mut()
            .filter(|fs| fs.is_active && fs.parent_id == parent_id)
        {
            field_set.is_active = false;
            field_set.updated_at = now;
            touched += 1;
        }
        Ok(touched)
    }

    async fn find_field_set_by_id(&self, config_id: &str) -> StoreResult<Option<FieldSetVersion>> {
        let field_sets = self.field_sets.read().await;
        Ok(field_sets.iter().find(|fs| fs.config_id == config_id).cloned())
    }

    async fn find_field_sets(&self, filter: &FieldSetFilter) -> StoreResult<Vec<FieldSetVersion>> {
        let field_sets = self.field_sets.read().await;
        Ok(field_sets
            .iter()
            .filter(|fs| filter.matches(fs))
            .cloned()
            .collect())
    }
}
