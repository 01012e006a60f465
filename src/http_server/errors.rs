//! # HTTP API Errors
//!
//! Every failure renders as `{"error": "<message>"}` with a status derived
//! from the error kind. Detailed causes are logged, never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::engine::ExecutionError;
use crate::observability::Logger;
use crate::store::StoreError;

/// Result type for HTTP handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// HTTP API errors
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Body could not be parsed
    #[error("{0}")]
    BadRequest(String),

    /// Missing `Authorization` header
    #[error("Unauthorized")]
    Unauthorized,

    /// Record absent
    #[error("{0}")]
    NotFound(String),

    /// Store failure other than a missing record
    #[error("Failed to {action}")]
    Storage { action: &'static str, detail: String },

    /// Contract execution or connector test failure
    #[error("{0}")]
    Execution(#[from] ExecutionError),
}

impl ApiError {
    /// Map a store failure; `action` names what was attempted, e.g. "save contract"
    pub fn storage(action: &'static str, err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } | StoreError::InvalidId { .. } => {
                ApiError::NotFound(not_found_message(&err))
            }
            other => ApiError::Storage {
                action,
                detail: other.to_string(),
            },
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Execution(err) => StatusCode::from_u16(err.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }
}

fn not_found_message(err: &StoreError) -> String {
    match err {
        StoreError::InvalidId { kind, .. } => format!("{} not found", kind),
        other => other.to_string(),
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Storage { action, detail } = &self {
            Logger::error("STORE_FAILURE", &[("action", *action), ("reason", detail.as_str())]);
        }

        let status = self.status_code();
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}
