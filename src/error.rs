//! Error types shared across the agent.
//!
//! Handlers never catch failures from I/O or the completion provider; every
//! error propagates up to the HTTP layer, which is the only place an
//! [`AgentError`] is translated into a status code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Every failure kind a task routine can surface.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Access outside the data directory is forbidden: {0}")]
    AccessDenied(String),

    #[error("Deletion operations are not allowed")]
    OperationForbidden,

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Unknown task: {0}")]
    UnknownTask(String),

    #[error("Completion provider request failed: {0}")]
    Provider(String),

    #[error("Command failed: {0}")]
    Exec(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

impl AgentError {
    /// Status code the HTTP front reports for this failure.
    ///
    /// Client mistakes (unknown task, malformed input, paths outside the
    /// sandbox) map to 4xx; everything else is a generic server error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AgentError::UnknownTask(_) | AgentError::BadRequest(_) | AgentError::AccessDenied(_) => {
                StatusCode::BAD_REQUEST
            }
            AgentError::OperationForbidden => StatusCode::FORBIDDEN,
            AgentError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AgentError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        }
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
