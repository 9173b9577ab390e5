//! Shared response envelope for all API endpoints.
//!
//! Every success body is `{ "success": true, "message": ..., "data": ... }`,
//! matching the contract the frontend already consumes. Errors produce the
//! same shape with `success: false` (see `error.rs`).

use axum::response::{IntoResponse, Response};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }

    /// Envelope with the default "ok" message.
    pub fn ok(data: T) -> Self {
        Self::new(data, "ok")
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        axum::Json(self).into_response()
    }
}
