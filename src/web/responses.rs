//! HTTP response types and error mapping
//!
//! Successful responses carry their payload as plain JSON so existing
//! sidecars and the dashboard front end can read them unchanged. Errors use
//! the [`ApiResponse`] envelope.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::errors::AppError;

/// Standard API response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the operation was successful
    pub success: bool,
    /// Response data (present on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error message (present on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn error(message: String) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now(),
        }
    }
}

/// Convert AppError to appropriate HTTP response
pub fn handle_error(error: AppError) -> Response {
    let (status, message) = match &error {
        AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message.clone()),
        AppError::Validation { message } => (StatusCode::UNPROCESSABLE_ENTITY, message.clone()),
        AppError::NotFound { resource, id } => (
            StatusCode::NOT_FOUND,
            format!("{} with id '{}' not found", resource, id),
        ),
        AppError::Conflict { operation } => (
            StatusCode::CONFLICT,
            format!("{} already in progress", operation),
        ),
        AppError::Io(e) => {
            error!("I/O error while handling request: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "File system operation failed".to_string(),
            )
        }
        AppError::Internal { message } => {
            error!("Internal error while handling request: {}", message);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Internal error: {}", message),
            )
        }
    };

    (status, Json(ApiResponse::<()>::error(message))).into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        handle_error(self)
    }
}

/// Success response helpers
pub fn created<T: Serialize>(data: T) -> impl IntoResponse {
    (StatusCode::CREATED, Json(data))
}

pub fn accepted<T: Serialize>(data: T) -> impl IntoResponse {
    (StatusCode::ACCEPTED, Json(ApiResponse::success(data)))
}

pub fn no_content() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}
