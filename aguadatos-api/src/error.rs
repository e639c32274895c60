//! Error types for aguadatos-api
//!
//! Every failure leaves the service as `{"error": "<message>"}` with the
//! status picked in [`ApiError::status`].

use aguadatos_common::Error as CommonError;
use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::response::failure;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Error raised by the registry or record store
    #[error(transparent)]
    Common(#[from] CommonError),

    /// Request could not be decoded (bad JSON, bad path parameter)
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Common(err) => match err {
                CommonError::MissingField { .. }
                | CommonError::InvalidEnum { .. }
                | CommonError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                CommonError::DuplicatePlant(_) | CommonError::DuplicateUser(_) => {
                    StatusCode::CONFLICT
                }
                CommonError::NotFound(_) => StatusCode::NOT_FOUND,
                CommonError::Storage(_) | CommonError::Io(_) | CommonError::Config(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Server-side details stay in the log
        let message = if status.is_server_error() {
            error!(error = %self, "Request failed");
            "Internal Server Error".to_string()
        } else {
            self.to_string()
        };

        failure(status, message)
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
