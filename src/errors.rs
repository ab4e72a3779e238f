//! Structured error handling with stable error codes.
//!
//! Every failure surfaces to the client as the standard response envelope
//! `{"success": false, "error": ..., "details": ...}`. Internal causes are
//! logged server-side and never leaked in the 500 message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;

/// Error body following the API response envelope.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,

    /// Human-readable error message
    pub error: String,

    /// Machine-readable context: error code, offending field when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application error types with proper categorization
#[derive(Debug)]
pub enum AppError {
    // Validation errors (400)
    InvalidInput { field: String, reason: String },

    // Authentication errors (401)
    MissingToken,
    InvalidToken(String),
    InvalidCredentials,

    // Not found (404) - also used for cross-user access so that the
    // existence of other users' rows is never leaked
    NotFound { resource: &'static str, id: i64 },
    UserNotFound,

    // Conflict errors (409)
    DuplicateName { resource: &'static str, name: String },

    // Internal errors (500)
    DatabaseError(String),

    // Generic wrapper for external errors
    Internal(anyhow::Error),
}

impl AppError {
    /// Get error code for client identification
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "INVALID_INPUT",
            Self::MissingToken => "MISSING_TOKEN",
            Self::InvalidToken(_) => "INVALID_TOKEN",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::DuplicateName { .. } => "DUPLICATE_NAME",
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput { .. } => StatusCode::BAD_REQUEST,

            Self::MissingToken | Self::InvalidToken(_) | Self::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }

            Self::NotFound { .. } | Self::UserNotFound => StatusCode::NOT_FOUND,

            Self::DuplicateName { .. } => StatusCode::CONFLICT,

            Self::DatabaseError(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the client-facing error message
    pub fn message(&self) -> String {
        match self {
            Self::InvalidInput { field, reason } => {
                format!("Invalid input for field '{field}': {reason}")
            }
            Self::MissingToken => "Missing Authorization: Bearer token".to_string(),
            Self::InvalidToken(reason) => format!("Invalid token: {reason}"),
            Self::InvalidCredentials => "Invalid credentials".to_string(),
            Self::NotFound { resource, id } => format!("{resource} not found: {id}"),
            Self::UserNotFound => "User not found".to_string(),
            Self::DuplicateName { resource, name } => {
                format!("{resource} with name '{name}' already exists")
            }
            // Internal causes are logged, not returned
            Self::DatabaseError(_) | Self::Internal(_) => "Internal server error".to_string(),
        }
    }

    /// Convert to the structured error envelope
    pub fn to_body(&self) -> ErrorBody {
        let details = match self {
            Self::InvalidInput { field, .. } => Some(serde_json::json!({
                "code": self.code(),
                "field": field,
            })),
            _ => Some(serde_json::json!({ "code": self.code() })),
        };

        ErrorBody {
            success: false,
            error: self.message(),
            details,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::Internal(err) => write!(f, "Internal error: {err}"),
            other => write!(f, "{}", other.message()),
        }
    }
}

impl std::error::Error for AppError {}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        Self::DatabaseError(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
        }

        (status, Json(self.to_body())).into_response()
    }
}

/// Helper trait to convert validation errors into field-tagged 400s
pub trait ValidationErrorExt<T> {
    fn map_validation_err(self, field: &str) -> Result<T>;
}

impl<T> ValidationErrorExt<T> for anyhow::Result<T> {
    fn map_validation_err(self, field: &str) -> Result<T> {
        self.map_err(|e| AppError::InvalidInput {
            field: field.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Type alias for Results using AppError
pub type Result<T> = std::result::Result<T, AppError>;
