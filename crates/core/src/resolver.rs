//! Resolving the configuration a client renders.
//!
//! Two modes: latest (whatever is active now) and pinned (the exact versions
//! recorded in a user's [`ConfigSnapshot`], active or not). Resolution only
//! reads; "nothing published yet" is an empty result, not an error.

use std::sync::Arc;

use crate::error::{CoreError, CoreResult};
use crate::store::{ConfigStore, FieldSetFilter, FlowFilter};
use crate::versions::{
    ConfigSnapshot, FieldSetVersion, FlowVersion, ResolvedConfig, DEFAULT_SCOPES, FLOW_SCOPE,
};

/// Resolver settings.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Field-set scopes resolved in latest mode, in rendering order.
    pub default_scopes: Vec<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            default_scopes: DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

pub struct ConfigResolver {
    store: Arc<dyn ConfigStore>,
    config: ResolverConfig,
}

impl ConfigResolver {
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self::with_config(store, ResolverConfig::default())
    }

    pub fn with_config(store: Arc<dyn ConfigStore>, config: ResolverConfig) -> Self {
        Self { store, config }
    }

    /// The active flow and the active field-sets of the default scopes.
    pub async fn resolve_latest(&self) -> CoreResult<ResolvedConfig> {
        let flow = self.active_flow().await?;
        let field_sets = self.active_field_sets().await?;
        tracing::debug!(
            flow_id = flow.as_ref().map(|f| f.flow_id.as_str()),
            field_sets = field_sets.len(),
            "Resolved latest configuration"
        );
        Ok(ResolvedConfig { flow, field_sets })
    }

    /// The pinned versions, falling back to latest for each absent half.
    ///
    /// A pinned id is looked up regardless of its active flag and must exist.
    /// `Some(&[])` for `config_ids` resolves to no field-sets.
    pub async fn resolve_by_snapshot(
        &self,
        flow_id: Option<&str>,
        config_ids: Option<&[String]>,
    ) -> CoreResult<ResolvedConfig> {
        let flow = match flow_id {
            Some(id) => Some(self.pinned_flow(id).await?),
            None => self.active_flow().await?,
        };
        let field_sets = match config_ids {
            Some(ids) => self.pinned_field_sets(ids).await?,
            None => self.active_field_sets().await?,
        };
        tracing::debug!(
            pinned_flow = flow_id.is_some(),
            pinned_field_sets = config_ids.is_some(),
            field_sets = field_sets.len(),
            "Resolved configuration by snapshot"
        );
        Ok(ResolvedConfig { flow, field_sets })
    }

    pub async fn resolve_snapshot(&self, snapshot: &ConfigSnapshot) -> CoreResult<ResolvedConfig> {
        self.resolve_by_snapshot(snapshot.flow_id.as_deref(), snapshot.config_ids.as_deref())
            .await
    }

    /// The active field-set of one scope, if any.
    pub async fn resolve_fields_by_parent(
        &self,
        parent_id: &str,
    ) -> CoreResult<Option<FieldSetVersion>> {
        let mut active = self
            .store
            .find_field_sets(&FieldSetFilter::ActiveInScope(parent_id.to_string()))
            .await
            .map_err(|e| CoreError::storage("find_field_sets", parent_id, e))?;
        ensure_single_active(parent_id, active.len())?;
        Ok(active.pop())
    }

    // -- Latest --

    async fn active_flow(&self) -> CoreResult<Option<FlowVersion>> {
        let mut active = self
            .store
            .find_flows(&FlowFilter::Active)
            .await
            .map_err(|e| CoreError::storage("find_flows", FLOW_SCOPE, e))?;
        ensure_single_active(FLOW_SCOPE, active.len())?;
        Ok(active.pop())
    }

    async fn active_field_sets(&self) -> CoreResult<Vec<FieldSetVersion>> {
        let scopes = &self.config.default_scopes;
        if scopes.is_empty() {
            return Ok(Vec::new());
        }
        let mut active = self
            .store
            .find_field_sets(&FieldSetFilter::ActiveInScopes(scopes.clone()))
            .await
            .map_err(|e| CoreError::storage("find_field_sets", scopes.join(","), e))?;

        for scope in scopes {
            let count = active.iter().filter(|fs| fs.parent_id == *scope).count();
            ensure_single_active(scope, count)?;
        }

        active.sort_by_key(|fs| self.scope_rank(&fs.parent_id));
        Ok(active)
    }

    // -- Pinned --

    async fn pinned_flow(&self, flow_id: &str) -> CoreResult<FlowVersion> {
        self.store
            .find_flow_by_id(flow_id)
            .await
            .map_err(|e| CoreError::storage("find_flow_by_id", FLOW_SCOPE, e))?
            .ok_or_else(|| CoreError::NotFound {
                entity: "FlowVersion",
                id: flow_id.to_string(),
            })
    }

    async fn pinned_field_sets(&self, config_ids: &[String]) -> CoreResult<Vec<FieldSetVersion>> {
        if config_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut found = self
            .store
            .find_field_sets(&FieldSetFilter::Ids(config_ids.to_vec()))
            .await
            .map_err(|e| CoreError::storage("find_field_sets", config_ids.join(","), e))?;

        if let Some(missing) = config_ids
            .iter()
            .find(|id| !found.iter().any(|fs| fs.config_id == **id))
        {
            return Err(CoreError::NotFound {
                entity: "FieldSetVersion",
                id: missing.clone(),
            });
        }

        // Group by scope, keeping the pinned order within a scope.
        found.sort_by_key(|fs| {
            let position = config_ids.iter().position(|id| *id == fs.config_id);
            (self.scope_rank(&fs.parent_id), fs.parent_id.clone(), position)
        });
        Ok(found)
    }

    /// Rendering position of a scope: default scopes first, in order.
    fn scope_rank(&self, parent_id: &str) -> usize {
        self.config
            .default_scopes
            .iter()
            .position(|s| s == parent_id)
            .unwrap_or(self.config.default_scopes.len())
    }
}

fn ensure_single_active(scope: &str, active: usize) -> CoreResult<()> {
    if active > 1 {
        tracing::error!(scope, active, "Scope has more than one active version");
        return Err(CoreError::InconsistentState {
            scope: scope.to_string(),
            active,
        });
    }
    Ok(())
}
