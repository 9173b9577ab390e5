use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::semaforo::ThresholdError;

/// Centralized user-facing messages so handlers and tests agree on wording.
pub mod msg {
    pub const INVALID_CREDENTIALS: &str = "Invalid credentials";
    pub const AUTH_REQUIRED: &str = "Authentication required";
    pub const USER_INACTIVE: &str = "User is inactive";
    pub const INSUFFICIENT_PERMISSIONS: &str = "Insufficient permissions for this action";

    pub const USER_NOT_FOUND: &str = "User not found";
    pub const CLIENT_NOT_FOUND: &str = "Client not found";
    pub const PRODUCT_NOT_FOUND: &str = "Product not found";
    pub const LINK_NOT_FOUND: &str = "Client-product link not found";
    pub const VIGENCIA_NOT_FOUND: &str = "Vigencia not found";
    pub const ALERT_CONFIG_NOT_FOUND: &str = "Alert configuration not found";

    pub const EMAIL_TAKEN: &str = "Email is already registered";
    pub const PRODUCT_NAME_TAKEN: &str = "A product with that name already exists";
    pub const LINK_ALREADY_EXISTS: &str = "Client already has this product";
    pub const PRODUCT_IN_USE: &str = "Product is associated to one or more clients";
    pub const CANNOT_DELETE_SELF: &str = "You cannot delete your own user";

    pub const EMAIL_EMPTY: &str = "Email cannot be empty";
    pub const INVALID_EMAIL_FORMAT: &str = "Invalid email format";
    pub const NAME_EMPTY: &str = "Name cannot be empty";
    pub const PASSWORD_TOO_SHORT: &str = "Password must be at least 8 characters";
    pub const NO_FIELDS_TO_UPDATE: &str = "No fields to update";

    pub const EXPIRATION_BEFORE_START: &str = "Expiration date must be after the start date";
    pub const WEBHOOK_REQUIRED: &str =
        "A Teams webhook URL is required when Teams notifications are enabled";
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Expiration date is not strictly after the start date.
    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    /// Non-monotonic or negative traffic-light thresholds.
    #[error("Invalid thresholds: {0}")]
    InvalidThresholds(#[from] ThresholdError),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error body in the shared response envelope shape.
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<String>,
}

impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<axum::extract::rejection::QueryRejection> for AppError {
    fn from(rejection: axum::extract::rejection::QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<axum::extract::rejection::PathRejection> for AppError {
    fn from(rejection: axum::extract::rejection::PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::InvalidDateRange(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::InvalidThresholds(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Pool(e) => {
                tracing::error!("Pool error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Json(e) => {
                tracing::error!("JSON error: {}", e);
                (StatusCode::BAD_REQUEST, format!("Invalid JSON: {}", e))
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = ErrorResponse {
            success: false,
            message,
            errors: None,
        };

        (status, Json(body)).into_response()
    }
}

/// Shorthand for turning `Option<T>` into `Result<T, AppError>` in handlers.
pub trait OptionExt<T> {
    fn or_not_found(self, message: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn or_not_found(self, message: &str) -> Result<T> {
        self.ok_or_else(|| AppError::NotFound(message.to_string()))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
