//! Error handling for the PharmaStock backend
//!
//! Every business-rule outcome maps to a stable machine-readable code;
//! storage errors are normalized and never leak internal detail.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is inactive")]
    AccountInactive,

    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    // Business rule outcomes
    #[error("Invoice number already exists for this supplier")]
    DuplicateInvoice,

    #[error("Issued boxes exceed available stock")]
    InsufficientStock,

    #[error("Cannot issue from an expired batch")]
    BatchExpired,

    #[error("Issued date cannot be before the first receipt date for this batch")]
    InvalidIssueDate,

    #[error("Duplicate key: {0}")]
    Conflict(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail {
                    code: "INVALID_CREDENTIALS".to_string(),
                    message: "Invalid username or password".to_string(),
                    field: None,
                },
            ),
            AppError::AccountInactive => (
                StatusCode::FORBIDDEN,
                ErrorDetail {
                    code: "ACCOUNT_INACTIVE".to_string(),
                    message: "Account is inactive".to_string(),
                    field: None,
                },
            ),
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message: message.clone(),
                    field: Some(field.clone()),
                },
            ),
            AppError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message: msg.clone(),
                    field: None,
                },
            ),
            AppError::DuplicateInvoice => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code: "DUPLICATE_INVOICE".to_string(),
                    message: "Invoice number already exists for this supplier".to_string(),
                    field: Some("invoice_number".to_string()),
                },
            ),
            AppError::InsufficientStock => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "INSUFFICIENT_STOCK".to_string(),
                    message: "Issued boxes exceed available stock".to_string(),
                    field: None,
                },
            ),
            AppError::BatchExpired => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "BATCH_EXPIRED".to_string(),
                    message: "Cannot issue from an expired batch".to_string(),
                    field: None,
                },
            ),
            AppError::InvalidIssueDate => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "INVALID_ISSUE_DATE".to_string(),
                    message: "Issued date cannot be before the first receipt date for this batch"
                        .to_string(),
                    field: Some("issued_date".to_string()),
                },
            ),
            AppError::Conflict(resource) => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code: "DUPLICATE_KEY".to_string(),
                    message: format!("A record with this {} already exists", resource),
                    field: Some(resource.clone()),
                },
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "NOT_FOUND".to_string(),
                    message: format!("{} not found", resource),
                    field: None,
                },
            ),
            AppError::Configuration(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "CONFIG_ERROR".to_string(),
                    message: format!("Configuration error: {}", msg),
                    field: None,
                },
            ),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "DATABASE_ERROR".to_string(),
                    message: "A database error occurred".to_string(),
                    field: None,
                },
            ),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred".to_string(),
                    field: None,
                },
            ),
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

/// True when the error is a unique violation on the named constraint.
pub fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        if matches!(db_err.kind(), sqlx::error::ErrorKind::UniqueViolation) {
            return db_err.constraint() == Some(constraint);
        }
    }
    false
}
