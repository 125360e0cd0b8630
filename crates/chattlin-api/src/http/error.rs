//! Application error type mapping to HTTP status codes and envelope format.

use axum::response::{IntoResponse, Response};

use chattlin_types::error::{JobError, RepositoryError};

use super::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    Repository(RepositoryError),
    Job(JobError),
    Validation(String),
    Internal(String),
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        AppError::Repository(e)
    }
}

impl From<JobError> for AppError {
    fn from(e: JobError) -> Self {
        AppError::Job(e)
    }
}

impl AppError {
    /// Machine-readable code and message for the envelope.
    pub fn code_and_message(&self) -> (&'static str, String) {
        match self {
            AppError::Repository(RepositoryError::NotFound) => {
                ("KEY_NOT_FOUND", "Key not found".to_string())
            }
            AppError::Repository(RepositoryError::Connection)
            | AppError::Job(JobError::Store(RepositoryError::Connection)) => {
                ("STORE_UNAVAILABLE", "Key-value store is unavailable".to_string())
            }
            AppError::Repository(RepositoryError::Conflict(msg)) => ("CONFLICT", msg.clone()),
            AppError::Repository(e) => ("STORE_ERROR", e.to_string()),
            AppError::Job(e) => ("VERSION_CHECK_FAILED", e.to_string()),
            AppError::Validation(msg) => ("VALIDATION_ERROR", msg.clone()),
            AppError::Internal(msg) => ("INTERNAL_ERROR", msg.clone()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (code, message) = self.code_and_message();
        if code == "INTERNAL_ERROR" || code == "STORE_ERROR" {
            tracing::error!(code, %message, "request failed");
        }
        ApiResponse::error(code, &message, String::new(), 0).into_response()
    }
}
