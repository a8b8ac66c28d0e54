//! Mapping of service failures onto HTTP responses.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use super::types::ErrorResponse;
use crate::errors::{ExtractionError, GenerationError};

/// Error returned by API handlers
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request violates an input constraint
    #[error("{0}")]
    BadRequest(String),

    /// The model is not loaded
    #[error("{0}")]
    Unavailable(String),

    /// Extraction or generation failed on our side
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Map a generation failure, prefixing server errors with the operation name
    pub fn from_generation(error: GenerationError, operation: &str) -> Self {
        match error {
            GenerationError::ModelNotReady => Self::Unavailable(error.to_string()),
            other => Self::Internal(format!("Error generating {}: {}", operation, other)),
        }
    }
}

impl From<ExtractionError> for ApiError {
    fn from(error: ExtractionError) -> Self {
        if error.is_client_error() {
            Self::BadRequest(error.to_string())
        } else {
            Self::Internal(format!("Error processing PDF: {}", error))
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
