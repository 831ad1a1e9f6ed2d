//! HTTP handlers for the shift lifecycle.
//!
//! `POST` starts a shift, `PUT` ends it. An entry moves from `active` to
//! `completed` exactly once.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use uuid::Uuid;

use crate::{
    error::AppError,
    extract::{ApiJson, ApiPath, ApiQuery},
    models::{
        ApiResponse,
        mileage_entry::{EndShiftRequest, ListEntriesQuery, MileageEntryResponse, StartShiftRequest},
    },
    services::shift_service,
    state::AppState,
};

/// List entries, newest first.
///
/// # Query Parameters
///
/// - `status`: `active` or `completed`
/// - `vehicleId`: restrict to one vehicle
pub async fn list_entries(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListEntriesQuery>,
) -> Result<Json<ApiResponse<Vec<MileageEntryResponse>>>, AppError> {
    let entries = shift_service::list_entries(&state.pool, &query).await?;
    Ok(Json(ApiResponse::success(
        entries.into_iter().map(MileageEntryResponse::from).collect(),
    )))
}

/// Start a shift.
///
/// # Request Body
///
/// ```json
/// {
///   "vehicleId": "550e8400-e29b-41d4-a716-446655440000",
///   "supervisorName": "J. Rivera",
///   "startMileage": 12000,
///   "startCondition": "good",
///   "startPhotos": { "front": "data:image/jpeg;base64,..." }
/// }
/// ```
///
/// Returns 201 Created with the `active` entry. Shift and date are derived
/// from the server clock when omitted.
pub async fn start_shift(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<StartShiftRequest>,
) -> Result<impl IntoResponse, AppError> {
    let entry = shift_service::start_shift(&state.pool, &state.config, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(MileageEntryResponse::from(entry))),
    ))
}

pub async fn get_entry(
    State(state): State<AppState>,
    ApiPath(entry_id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<MileageEntryResponse>>, AppError> {
    let entry = shift_service::get_entry(&state.pool, entry_id).await?;
    Ok(Json(ApiResponse::success(entry.into())))
}

/// End an active shift.
///
/// # Request Body
///
/// ```json
/// { "endMileage": 12050, "notes": "Quiet night", "endCondition": "good" }
/// ```
///
/// # Errors
///
/// - 404: entry missing or already completed
/// - 400: `endMileage` below `startMileage`
pub async fn end_shift(
    State(state): State<AppState>,
    ApiPath(entry_id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<EndShiftRequest>,
) -> Result<Json<ApiResponse<MileageEntryResponse>>, AppError> {
    let entry = shift_service::end_shift(&state.pool, entry_id, request).await?;

    state.notifier.shift_completed(entry.clone());

    Ok(Json(ApiResponse::success(entry.into())))
}

/// Delete an entry and return it. Active entries are refused unless the
/// server allows it.
pub async fn delete_entry(
    State(state): State<AppState>,
    ApiPath(entry_id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<MileageEntryResponse>>, AppError> {
    let entry = shift_service::delete_entry(
        &state.pool,
        entry_id,
        state.config.allow_active_entry_deletion,
    )
    .await?;
    Ok(Json(ApiResponse::success(entry.into())))
}
