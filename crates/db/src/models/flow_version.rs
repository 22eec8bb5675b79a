//! Flow version rows (`form_flows`).

use formflow_core::types::{DbId, Timestamp};
use formflow_core::versions::FlowVersion;
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `form_flows` table.
#[derive(Debug, Clone, FromRow)]
pub struct FlowVersionRow {
    pub id: DbId,
    pub flow_id: String,
    pub steps: Json<Vec<serde_json::Value>>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a flow version.
#[derive(Debug, Clone)]
pub struct CreateFlowVersion {
    pub flow_id: String,
    pub steps: Vec<serde_json::Value>,
    pub is_active: bool,
}

impl From<&FlowVersion> for CreateFlowVersion {
    fn from(flow: &FlowVersion) -> Self {
        Self {
            flow_id: flow.flow_id.clone(),
            steps: flow.steps.clone(),
            is_active: flow.is_active,
        }
    }
}

impl From<FlowVersionRow> for FlowVersion {
    fn from(row: FlowVersionRow) -> Self {
        Self {
            flow_id: row.flow_id,
            steps: row.steps.0,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
