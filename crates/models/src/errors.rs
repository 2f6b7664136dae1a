use thiserror::Error;

use crate::validation::FieldErrors;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("validation error: {}", .0.summary())]
    Validation(FieldErrors),
}

impl ModelError {
    pub fn field_errors(&self) -> &FieldErrors {
        match self {
            ModelError::Validation(errors) => errors,
        }
    }
}
