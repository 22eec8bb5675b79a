//! Flow and field-set versions, snapshots and resolved views.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::fields::{FieldDescriptor, FieldInput, OtherConfig};
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Scopes
// ---------------------------------------------------------------------------

/// Scope key of the personal-details step.
pub const SCOPE_PERSONAL: &str = "pers_1";

/// Scope key of the education step.
pub const SCOPE_EDUCATION: &str = "edu_2";

/// Scope key of the professional step.
pub const SCOPE_PROFESSIONAL: &str = "pro_3";

/// Scope key of the document-upload step.
pub const SCOPE_DOCUMENT: &str = "doc_4";

/// Field-set scopes resolved when no snapshot is pinned, in rendering order.
pub const DEFAULT_SCOPES: &[&str] = &[
    SCOPE_PERSONAL,
    SCOPE_EDUCATION,
    SCOPE_PROFESSIONAL,
    SCOPE_DOCUMENT,
];

/// Name of the single flow scope, used in logs and errors.
pub const FLOW_SCOPE: &str = "flow";

// ---------------------------------------------------------------------------
// Flow versions
// ---------------------------------------------------------------------------

/// One published version of the form's step layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowVersion {
    pub flow_id: String,
    /// Step descriptors, stored as given by the caller.
    pub steps: Vec<serde_json::Value>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Input for publishing a flow.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewFlow {
    /// Generated when absent.
    pub flow_id: Option<String>,
    pub steps: Vec<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Field-set versions
// ---------------------------------------------------------------------------

/// One published version of the fields of a single step scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSetVersion {
    pub config_id: String,
    pub parent_id: String,
    pub fields: Vec<FieldDescriptor>,
    pub file_included: bool,
    pub other_config: OtherConfig,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Input for publishing a field-set. Fields are validated on publish.
#[derive(Debug, Clone, Deserialize)]
pub struct NewFieldSet {
    /// Generated when absent.
    pub config_id: Option<String>,
    pub parent_id: String,
    pub fields: Vec<FieldInput>,
    pub file_included: bool,
    pub other_config: OtherConfig,
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// The configuration version ids frozen onto a user at registration.
///
/// Holds ids only; later publications cannot change what it resolves to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    pub flow_id: Option<String>,
    pub config_ids: Option<Vec<String>>,
}

// ---------------------------------------------------------------------------
// Resolved view
// ---------------------------------------------------------------------------

/// The combined configuration a client needs to render the form.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolvedConfig {
    pub flow: Option<FlowVersion>,
    pub field_sets: Vec<FieldSetVersion>,
}

impl ResolvedConfig {
    /// Project to the ids a user snapshot records.
    pub fn snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot {
            flow_id: self.flow.as_ref().map(|f| f.flow_id.clone()),
            config_ids: Some(
                self.field_sets
                    .iter()
                    .map(|fs| fs.config_id.clone())
                    .collect(),
            ),
        }
    }

    /// Field-sets grouped by scope key.
    pub fn grouped_by_parent(&self) -> BTreeMap<&str, Vec<&FieldSetVersion>> {
        let mut groups: BTreeMap<&str, Vec<&FieldSetVersion>> = BTreeMap::new();
        for field_set in &self.field_sets {
            groups
                .entry(field_set.parent_id.as_str())
                .or_default()
                .push(field_set);
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn field_set(config_id: &str, parent_id: &str) -> FieldSetVersion {
        let now = Utc::now();
        FieldSetVersion {
            config_id: config_id.to_string(),
            parent_id: parent_id.to_string(),
            fields: Vec::new(),
            file_included: false,
            other_config: OtherConfig::default(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn empty_view_snapshots_to_no_flow_and_empty_ids() {
        let snapshot = ResolvedConfig::default().snapshot();
        assert_eq!(snapshot.flow_id, None);
        assert_eq!(snapshot.config_ids, Some(Vec::new()));
    }

    #[test]
    fn snapshot_keeps_field_set_order() {
        let view = ResolvedConfig {
            flow: None,
            field_sets: vec![field_set("b", SCOPE_PERSONAL), field_set("a", SCOPE_EDUCATION)],
        };
        assert_eq!(
            view.snapshot().config_ids,
            Some(vec!["b".to_string(), "a".to_string()])
        );
    }

    #[test]
    fn grouped_by_parent_collects_each_scope() {
        let view = ResolvedConfig {
            flow: None,
            field_sets: vec![
                field_set("1", SCOPE_PERSONAL),
                field_set("2", SCOPE_EDUCATION),
                field_set("3", SCOPE_PERSONAL),
            ],
        };
        let groups = view.grouped_by_parent();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[SCOPE_PERSONAL].len(), 2);
        assert_eq!(groups[SCOPE_EDUCATION][0].config_id, "2");
    }

    #[test]
    fn default_scopes_are_in_rendering_order() {
        assert_eq!(DEFAULT_SCOPES, &["pers_1", "edu_2", "pro_3", "doc_4"]);
    }
}
