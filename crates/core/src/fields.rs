//! Field descriptors for field-set versions.
//!
//! Administrators submit fields in the loose wire shape [`FieldInput`]
//! (a `type` string plus optional `values`). Publishing converts each input
//! into a [`FieldDescriptor`], whose [`FieldKind`] carries a non-empty
//! [`FieldOptions`] list exactly for the choice types (`radio`, `select`).
//! Once converted, a descriptor cannot be missing its options.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Field type
// ---------------------------------------------------------------------------

/// The field types a form step can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    TextArea,
    Radio,
    Select,
    Number,
    Document,
}

/// Every accepted `type` string, in declaration order.
pub const FIELD_TYPES: &[&str] = &["text", "text_area", "radio", "select", "number", "document"];

impl FieldType {
    /// Parse a wire `type` string.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "text" => Ok(Self::Text),
            "text_area" => Ok(Self::TextArea),
            "radio" => Ok(Self::Radio),
            "select" => Ok(Self::Select),
            "number" => Ok(Self::Number),
            "document" => Ok(Self::Document),
            _ => Err(CoreError::Validation(format!(
                "Invalid field type '{s}'. Must be one of: {}",
                FIELD_TYPES.join(", ")
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::TextArea => "text_area",
            Self::Radio => "radio",
            Self::Select => "select",
            Self::Number => "number",
            Self::Document => "document",
        }
    }
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// One selectable `{value, label}` pair of a radio or select field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    pub value: String,
    pub label: String,
}

/// A non-empty, ordered list of options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<FieldOption>", into = "Vec<FieldOption>")]
pub struct FieldOptions(Vec<FieldOption>);

impl TryFrom<Vec<FieldOption>> for FieldOptions {
    type Error = CoreError;

    fn try_from(options: Vec<FieldOption>) -> Result<Self, Self::Error> {
        if options.is_empty() {
            return Err(CoreError::Validation(
                "Options list must contain at least one option".to_string(),
            ));
        }
        for (idx, option) in options.iter().enumerate() {
            if option.value.trim().is_empty() || option.label.trim().is_empty() {
                return Err(CoreError::Validation(format!(
                    "Option {idx} must have a non-empty value and label"
                )));
            }
        }
        Ok(Self(options))
    }
}

impl From<FieldOptions> for Vec<FieldOption> {
    fn from(options: FieldOptions) -> Self {
        options.0
    }
}

// ---------------------------------------------------------------------------
// Descriptor
// ---------------------------------------------------------------------------

/// Type-specific part of a field descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    TextArea,
    Radio { values: FieldOptions },
    Select { values: FieldOptions },
    Number,
    Document,
}

impl FieldKind {
    pub fn field_type(&self) -> FieldType {
        match self {
            Self::Text => FieldType::Text,
            Self::TextArea => FieldType::TextArea,
            Self::Radio { .. } => FieldType::Radio,
            Self::Select { .. } => FieldType::Select,
            Self::Number => FieldType::Number,
            Self::Document => FieldType::Document,
        }
    }

    /// The options of a choice field, `None` for every other kind.
    pub fn options(&self) -> Option<&FieldOptions> {
        match self {
            Self::Radio { values } | Self::Select { values } => Some(values),
            _ => None,
        }
    }
}

/// A validated field of a field-set version.
///
/// Serializes to the flat document shape stored in the field-set collection:
/// `{"type": "radio", "values": [...], "label": ..., "name": ..., ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    #[serde(flatten)]
    pub kind: FieldKind,
    pub label: String,
    pub name: String,
    #[serde(rename = "className", default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    pub required: bool,
    pub enabled: bool,
}

/// A field as submitted by an administrator, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldInput {
    #[serde(rename = "type")]
    pub field_type: String,
    pub label: String,
    pub name: String,
    #[serde(rename = "className", default)]
    pub class_name: Option<String>,
    pub required: bool,
    pub enabled: bool,
    #[serde(default)]
    pub values: Option<Vec<FieldOption>>,
}

impl TryFrom<FieldInput> for FieldDescriptor {
    type Error = CoreError;

    /// Validate a submitted field.
    ///
    /// Choice types must carry at least one option. `values` given for any
    /// other type are dropped.
    fn try_from(input: FieldInput) -> Result<Self, Self::Error> {
        let field_type = FieldType::parse(&input.field_type)?;

        if input.label.trim().is_empty() {
            return Err(CoreError::Validation(format!(
                "Field '{}' must have a non-empty label",
                input.name
            )));
        }
        if input.name.trim().is_empty() {
            return Err(CoreError::Validation(
                "Field name must not be empty".to_string(),
            ));
        }

        let kind = match field_type {
            FieldType::Radio => FieldKind::Radio {
                values: required_options(&input.name, field_type, input.values)?,
            },
            FieldType::Select => FieldKind::Select {
                values: required_options(&input.name, field_type, input.values)?,
            },
            FieldType::Text => FieldKind::Text,
            FieldType::TextArea => FieldKind::TextArea,
            FieldType::Number => FieldKind::Number,
            FieldType::Document => FieldKind::Document,
        };

        Ok(Self {
            kind,
            label: input.label,
            name: input.name,
            class_name: input.class_name,
            required: input.required,
            enabled: input.enabled,
        })
    }
}

fn required_options(
    name: &str,
    field_type: FieldType,
    values: Option<Vec<FieldOption>>,
) -> Result<FieldOptions, CoreError> {
    let values = values.ok_or_else(|| {
        CoreError::Validation(format!(
            "Field '{name}' of type {} requires a 'values' list",
            field_type.as_str()
        ))
    })?;
    FieldOptions::try_from(values)
        .map_err(|e| CoreError::Validation(format!("Field '{name}': {}", validation_msg(e))))
}

fn validation_msg(err: CoreError) -> String {
    match err {
        CoreError::Validation(msg) => msg,
        other => other.to_string(),
    }
}

/// Validate a list of submitted fields, failing on the first invalid one.
pub fn validate_fields(inputs: Vec<FieldInput>) -> Result<Vec<FieldDescriptor>, CoreError> {
    inputs
        .into_iter()
        .enumerate()
        .map(|(idx, input)| {
            FieldDescriptor::try_from(input).map_err(|e| {
                CoreError::Validation(format!("fields[{idx}]: {}", validation_msg(e)))
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Other config
// ---------------------------------------------------------------------------

/// Per-field-set rendering options.
///
/// Numbers are plain JSON numbers and `file_types` may hold `null` entries,
/// as stored by existing administrators.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OtherConfig {
    /// Whether the step repeats (e.g. several education entries).
    #[serde(rename = "loop")]
    pub is_loop: bool,
    #[serde(default)]
    pub limit: Option<f64>,
    /// Maximum upload size in bytes.
    #[serde(default)]
    pub max_file_size: Option<f64>,
    #[serde(default)]
    pub file_types: Option<Vec<Option<String>>>,
}

/// Validate the rendering options of a field-set.
///
/// Set numbers must be positive. Non-null file types must not be blank.
pub fn validate_other_config(config: &OtherConfig) -> Result<(), CoreError> {
    if config.limit.is_some_and(|n| n <= 0.0) {
        return Err(CoreError::Validation(
            "other_config.limit must be positive when set".to_string(),
        ));
    }
    if config.max_file_size.is_some_and(|n| n <= 0.0) {
        return Err(CoreError::Validation(
            "other_config.max_file_size must be positive when set".to_string(),
        ));
    }
    if let Some(types) = &config.file_types {
        if types.iter().flatten().any(|t| t.trim().is_empty()) {
            return Err(CoreError::Validation(
                "other_config.file_types must not contain empty entries".to_string(),
            ));
        }
    }
    Ok(())
}

/// Validate a field-set scope key.
pub fn validate_parent_id(parent_id: &str) -> Result<(), CoreError> {
    if parent_id.trim().is_empty() {
        return Err(CoreError::Validation(
            "parent_id must not be empty".to_string(),
        ));
    }
    Ok(())
}
