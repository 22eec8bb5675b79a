//! Publishing new flow and field-set versions.
//!
//! A publish deactivates every current version of the scope and appends the
//! new version as the active one. Validation happens before the first write.

use std::sync::Arc;

use chrono::Utc;

use crate::error::{CoreError, CoreResult};
use crate::fields::{validate_fields, validate_other_config, validate_parent_id};
use crate::ids::{IdGenerator, UuidIdGenerator};
use crate::store::{ConfigStore, PublishFailure};
use crate::versions::{FieldSetVersion, FlowVersion, NewFieldSet, NewFlow, FLOW_SCOPE};

pub struct VersionPublisher {
    store: Arc<dyn ConfigStore>,
    ids: Arc<dyn IdGenerator>,
}

impl VersionPublisher {
    /// Publisher generating UUID v7 ids for versions submitted without one.
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self::with_ids(store, Arc::new(UuidIdGenerator))
    }

    pub fn with_ids(store: Arc<dyn ConfigStore>, ids: Arc<dyn IdGenerator>) -> Self {
        Self { store, ids }
    }

    /// Publish a new flow layout and make it the only active flow.
    pub async fn publish_flow(&self, input: NewFlow) -> CoreResult<FlowVersion> {
        let flow_id = self.id_or_generate(input.flow_id)?;
        let now = Utc::now();
        let version = FlowVersion {
            flow_id,
            steps: input.steps,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let created = self
            .store
            .replace_active_flow(&version)
            .await
            .map_err(|e| publish_error(FLOW_SCOPE, e))?;

        tracing::info!(
            flow_id = %created.flow_id,
            steps = created.steps.len(),
            "Published flow version"
        );
        Ok(created)
    }

    /// Publish a new field-set for `input.parent_id` and make it the only
    /// active one in that scope.
    ///
    /// Fails with [`CoreError::Validation`] before any write when a field is
    /// malformed, e.g. a radio or select field without options.
    pub async fn publish_field_set(&self, input: NewFieldSet) -> CoreResult<FieldSetVersion> {
        validate_parent_id(&input.parent_id)?;
        validate_other_config(&input.other_config)?;
        let fields = validate_fields(input.fields)?;
        let config_id = self.id_or_generate(input.config_id)?;

        let now = Utc::now();
        let version = FieldSetVersion {
            config_id,
            parent_id: input.parent_id,
            fields,
            file_included: input.file_included,
            other_config: input.other_config,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let created = self
            .store
            .replace_active_field_set(&version)
            .await
            .map_err(|e| publish_error(&version.parent_id, e))?;

        tracing::info!(
            config_id = %created.config_id,
            parent_id = %created.parent_id,
            fields = created.fields.len(),
            "Published field-set version"
        );
        Ok(created)
    }

    fn id_or_generate(&self, id: Option<String>) -> CoreResult<String> {
        match id {
            Some(id) if id.trim().is_empty() => {
                Err(CoreError::Validation("Version id must not be empty".to_string()))
            }
            Some(id) => Ok(id),
            None => Ok(self.ids.next_id()),
        }
    }
}

fn publish_error(scope: &str, failure: PublishFailure) -> CoreError {
    tracing::error!(
        scope,
        operation = failure.operation,
        error = %failure.source,
        "Publish failed"
    );
    CoreError::storage(failure.operation, scope, failure.source)
}
