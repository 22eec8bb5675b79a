//! Field-set version rows (`form_field_sets`).

use formflow_core::fields::{FieldDescriptor, OtherConfig};
use formflow_core::types::{DbId, Timestamp};
use formflow_core::versions::FieldSetVersion;
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `form_field_sets` table.
#[derive(Debug, Clone, FromRow)]
pub struct FieldSetVersionRow {
    pub id: DbId,
    pub config_id: String,
    pub parent_id: String,
    pub fields: Json<Vec<FieldDescriptor>>,
    pub file_included: bool,
    pub other_config: Json<OtherConfig>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a field-set version. Fields are already validated.
#[derive(Debug, Clone)]
pub struct CreateFieldSetVersion {
    pub config_id: String,
    pub parent_id: String,
    pub fields: Vec<FieldDescriptor>,
    pub file_included: bool,
    pub other_config: OtherConfig,
    pub is_active: bool,
}

impl From<&FieldSetVersion> for CreateFieldSetVersion {
    fn from(field_set: &FieldSetVersion) -> Self {
        Self {
            config_id: field_set.config_id.clone(),
            parent_id: field_set.parent_id.clone(),
            fields: field_set.fields.clone(),
            file_included: field_set.file_included,
            other_config: field_set.other_config.clone(),
            is_active: field_set.is_active,
        }
    }
}

impl From<FieldSetVersionRow> for FieldSetVersion {
    fn from(row: FieldSetVersionRow) -> Self {
        Self {
            config_id: row.config_id,
            parent_id: row.parent_id,
            fields: row.fields.0,
            file_included: row.file_included,
            other_config: row.other_config.0,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
