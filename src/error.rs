//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and the JSON envelope
//! `{ "success": false, "error": "..." }`.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{db::is_unique_violation, models::ApiResponse};

/// Application-wide error type.
///
/// # Error Categories
///
/// - **Validation Errors**: malformed, missing or out-of-range input
/// - **Conflict Errors**: unique-key collisions (license plate, badge number,
///   second active shift for a vehicle)
/// - **Not Found Errors**: missing records, or entries that are already terminal
/// - **Database / Internal Errors**: anything unexpected
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed (e.g., connection error, query error).
    ///
    /// Returns HTTP 500; the underlying error is logged, never sent to clients.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Request body, path or query parameters are invalid.
    ///
    /// Returns HTTP 400 Bad Request.
    #[error("{0}")]
    Validation(String),

    /// A unique key is already taken.
    ///
    /// Returns HTTP 400 Bad Request, like the validation errors.
    #[error("{0}")]
    Conflict(String),

    /// Target record does not exist or is no longer in a state the operation accepts.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("{0}")]
    NotFound(String),

    /// Unexpected failure outside the database layer.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Translate a failed write into `Conflict` when the storage layer
    /// reported a unique-constraint violation.
    pub fn conflict_on_unique(error: sqlx::Error, message: &str) -> Self {
        if is_unique_violation(&error) {
            AppError::Conflict(message.to_string())
        } else {
            AppError::Database(error)
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Conflict(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Convert AppError into an HTTP response.
///
/// # Status Code Mapping
///
/// - `Validation`, `Conflict` → 400 Bad Request
/// - `NotFound` → 404 Not Found
/// - `Database`, `Internal` → 500 Internal Server Error (hides details from client)
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = match self {
            AppError::Database(ref error) => {
                tracing::error!(error = %error, "database error");
                "An internal error occurred".to_string()
            }
            AppError::Internal(ref detail) => {
                tracing::error!(detail = %detail, "internal error");
                "An internal error occurred".to_string()
            }
            AppError::Validation(msg) | AppError::Conflict(msg) | AppError::NotFound(msg) => msg,
        };

        (status, Json(ApiResponse::<()>::failure(message))).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn render(error: AppError) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_validation_maps_to_400_envelope() {
        let (status, body) = render(AppError::Validation("endMileage too low".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "endMileage too low");
        assert!(body.get("data").is_none());
    }

    #[tokio::test]
    async fn test_conflict_maps_to_400() {
        let (status, body) = render(AppError::Conflict("License plate already exists".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "License plate already exists");
    }

    #[tokio::test]
    async fn test_not_found_maps_to_404() {
        let (status, _) = render(AppError::NotFound("Mileage entry not found".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_database_error_hides_details() {
        let (status, body) = render(AppError::Database(sqlx::Error::RowNotFound)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "An internal error occurred");
    }

    #[test]
    fn test_conflict_on_unique_passes_other_errors_through() {
        let error = AppError::conflict_on_unique(sqlx::Error::PoolTimedOut, "dup");
        assert!(matches!(error, AppError::Database(sqlx::Error::PoolTimedOut)));
    }
}
