use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Storage error during {operation} (scope {scope}): {source}")]
    Storage {
        operation: &'static str,
        scope: String,
        #[source]
        source: StoreError,
    },

    /// A scope was found with more than one active version.
    #[error("Inconsistent state: scope {scope} has {active} active versions")]
    InconsistentState { scope: String, active: usize },

    #[error("Conflict: {0}")]
    Conflict(String),
}

impl CoreError {
    /// Wrap a store failure with the operation and scope it happened in.
    pub fn storage(operation: &'static str, scope: impl Into<String>, source: StoreError) -> Self {
        Self::Storage {
            operation,
            scope: scope.into(),
            source,
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
