//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use workflow::WorkflowError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Workflow error.
    Workflow(WorkflowError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Workflow(err) => workflow_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn workflow_error_to_response(err: WorkflowError) -> (StatusCode, String) {
    match &err {
        WorkflowError::UserNotFound(_)
        | WorkflowError::ProductNotFound(_)
        | WorkflowError::OrderNotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        WorkflowError::InvalidInput(_)
        | WorkflowError::InsufficientFunds { .. }
        | WorkflowError::InsufficientStock { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
        WorkflowError::DependencyFailure(_) | WorkflowError::Store(_) => {
            tracing::error!(error = %err, "workflow dependency failure");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        ApiError::Workflow(err)
    }
}
