// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use crate::store::StoreError;

/// Global Application Error Enum.
/// Every variant is reported to clients as a `200 OK` body of
/// `{"success": false, "message": ...}`; clients inspect `success`, not the status.
#[derive(Debug)]
pub enum AppError {
    /// Malformed identifier, query parameter or missing required field.
    ParamsInvalid(String),

    /// No matching document, or an empty page.
    NotFound(String),

    /// A write reported no effect.
    WriteFailed(String),

    /// Missing/invalid token, or a role outside the permitted set.
    Unauthorized(String),

    /// Anything else. The message is passed through verbatim.
    Unexpected(String),
}

impl AppError {
    pub fn message(&self) -> &str {
        match self {
            AppError::ParamsInvalid(msg)
            | AppError::NotFound(msg)
            | AppError::WriteFailed(msg)
            | AppError::Unauthorized(msg)
            | AppError::Unexpected(msg) => msg,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

/// Converts the error into the `{success:false, message}` JSON envelope.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Unexpected(msg) => tracing::error!("Unexpected error: {}", msg),
            AppError::Unauthorized(msg) => tracing::warn!("Rejected request: {}", msg),
            other => tracing::debug!("Request failed: {}", other.message()),
        }

        let body = Json(json!({
            "success": false,
            "message": self.message(),
        }));

        (StatusCode::OK, body).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        let message = err.to_string();
        match err {
            StoreError::ParamsInvalid => AppError::ParamsInvalid(message),
            StoreError::NotFound(_) | StoreError::EmptyPage(_) => AppError::NotFound(message),
            StoreError::WriteFailed(_) => AppError::WriteFailed(message),
            StoreError::Unexpected(_) => AppError::Unexpected(message),
        }
    }
}
