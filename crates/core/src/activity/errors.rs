//! Error type for activity logging.

use thiserror::Error;

use crate::models::{ModelError, RegistryError};
use crate::schema::SchemaError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ActivityError {
    /// `performed_on`/`caused_by` got something that cannot be referenced.
    #[error("invalid {method}() argument: {reason}")]
    InvalidArgument { method: &'static str, reason: String },

    /// `get_extra_property` on a record whose properties were never set.
    #[error("activity has no properties")]
    PropertiesUnset,

    /// A stored kind name has no registered model.
    #[error("no model registered for kind '{0}'")]
    UnknownKind(String),

    /// A stored activity document could not be decoded.
    #[error("invalid activity data: {0}")]
    InvalidData(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl From<ModelError> for ActivityError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::Store(e) => Self::Store(e),
            ModelError::Schema(e) => Self::Schema(e),
            e @ ModelError::KindMismatch { .. } => Self::InvalidData(e.to_string()),
        }
    }
}
