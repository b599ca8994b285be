//! Application-level HTTP error type.
//!
//! `AppError` is the error surface for the axum handlers. Domain errors
//! (weather lookups, call sessions) are defined next to their modules and
//! converted here only when they need to become an HTTP response.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Result alias for handlers returning `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Errors surfaced as HTTP responses by the tool server's message endpoint.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The referenced transport session does not exist.
    #[error("unknown session: {0}")]
    SessionNotFound(String),

    /// The referenced transport session exists but its client went away.
    #[error("session disconnected: {0}")]
    SessionGone(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            AppError::SessionGone(_) => StatusCode::GONE,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
