use std::path::Path;

use models::{FieldErrors, ModelError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {}", .0.summary())]
    Validation(FieldErrors),
    #[error("duplicate resource: {}", .0.summary())]
    Duplicate(FieldErrors),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    pub fn storage(path: &Path, action: &str, err: impl std::fmt::Display) -> Self {
        Self::Storage(format!("{action} {}: {err}", path.display()))
    }

    /// Field-keyed messages for errors that carry them.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation(errors) | Self::Duplicate(errors) => Some(errors),
            Self::NotFound(_) | Self::Storage(_) => None,
        }
    }
}

impl From<ModelError> for ServiceError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::Validation(errors) => Self::Validation(errors),
        }
    }
}
