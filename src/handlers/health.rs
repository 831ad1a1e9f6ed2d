//! Health check endpoint for service monitoring.

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{db::DbPool, error::AppError, models::ApiResponse};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
    pub version: &'static str,
    pub timestamp: DateTime<Utc>,
}

/// Health check handler.
///
/// # Response (200 OK)
///
/// ```json
/// {
///   "success": true,
///   "data": { "status": "healthy", "database": "connected", "version": "0.1.0", "timestamp": "2025-03-10T19:00:00Z" }
/// }
/// ```
///
/// If the database is unreachable the standard error envelope is returned with 500.
pub async fn health_check(
    State(pool): State<DbPool>,
) -> Result<Json<ApiResponse<HealthResponse>>, AppError> {
    sqlx::query("SELECT 1").execute(&pool).await?;

    Ok(Json(ApiResponse::success(HealthResponse {
        status: "healthy".to_string(),
        database: "connected".to_string(),
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now(),
    })))
}
