use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::types::MessageBody;
use models::FieldErrors;
use service::errors::ServiceError;
use thiserror::Error;
use tracing::error;

pub const CITY_NOT_FOUND: &str = "City not found";

/// JSON error response: `{"message": ...}` plus `errors` for 422s.
#[derive(Debug)]
pub struct JsonApiError {
    status: StatusCode,
    body: serde_json::Value,
}

impl JsonApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        let body = serde_json::to_value(MessageBody::new(message)).unwrap_or_default();
        Self { status, body }
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, CITY_NOT_FOUND)
    }

    pub fn unprocessable(errors: &FieldErrors) -> Self {
        let body = serde_json::json!({
            "message": errors.summary(),
            "errors": errors,
        });
        Self { status: StatusCode::UNPROCESSABLE_ENTITY, body }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(errors) | ServiceError::Duplicate(errors) => Self::unprocessable(&errors),
            ServiceError::NotFound(_) => Self::not_found(),
            ServiceError::Storage(msg) => {
                error!(error = %msg, "city storage failure");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Server Error")
            }
        }
    }
}

impl From<models::ModelError> for JsonApiError {
    fn from(err: models::ModelError) -> Self {
        Self::unprocessable(err.field_errors())
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("storage initialization failed: {0}")]
    Storage(#[from] ServiceError),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
