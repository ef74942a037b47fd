//! Grid errors
//!
//! Only malformed requests surface as errors. Gestures that target ids the
//! grid does not know are no-ops and never reach this type.

use thiserror::Error;

/// Common result type for grid operations
pub type GridResult<T> = Result<T, GridError>;

#[derive(Debug, Error)]
pub enum GridError {
    /// Blank title, or a select column without options
    #[error("invalid column: {reason}")]
    InvalidColumn { reason: String },

    #[error("unknown parent item: {id}")]
    UnknownParent { id: String },

    #[error("unknown subitem collection: {name}")]
    UnknownCollection { name: String },

    #[error("invalid grid config: {reason}")]
    InvalidConfig { reason: String },

    #[error("failed to parse grid config: {0}")]
    Config(#[from] serde_json::Error),
}

impl GridError {
    pub(crate) fn invalid_column(reason: impl Into<String>) -> Self {
        GridError::InvalidColumn {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        GridError::InvalidConfig {
            reason: reason.into(),
        }
    }
}
