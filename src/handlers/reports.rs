//! Read-only reporting endpoints.

use axum::{Json, extract::State};

use crate::{
    error::AppError,
    extract::ApiQuery,
    models::{
        ApiResponse,
        report::{DailyCoverageQuery, PeriodSummary, SummaryQuery, VehicleCoverage},
    },
    services::report_service,
    state::AppState,
};

/// Per-vehicle, per-day miles over a trailing window.
///
/// # Query Parameters
///
/// - `vehicleId`: single vehicle (404 when unknown); all vehicles otherwise
/// - `days`: window length, defaults to the configured window
/// - `endDate`: last day of the window (`YYYY-MM-DD`), defaults to today
pub async fn daily_coverage(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<DailyCoverageQuery>,
) -> Result<Json<ApiResponse<Vec<VehicleCoverage>>>, AppError> {
    let coverage = report_service::coverage_report(&state.pool, &state.config, &query).await?;
    Ok(Json(ApiResponse::success(coverage)))
}

/// Totals over `today`, `week`, `month` or `all` completed shifts.
pub async fn summary(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SummaryQuery>,
) -> Result<Json<ApiResponse<PeriodSummary>>, AppError> {
    let summary = report_service::summary_report(&state.pool, &state.config, &query).await?;
    Ok(Json(ApiResponse::success(summary)))
}
