//! HTTP handlers for the supervisor roster.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use uuid::Uuid;

use crate::{
    error::AppError,
    extract::{ApiJson, ApiPath},
    models::{
        ApiResponse,
        supervisor::{CreateSupervisorRequest, Supervisor, UpdateSupervisorRequest},
    },
    services::supervisor_service,
    state::AppState,
};

pub async fn list_supervisors(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Supervisor>>>, AppError> {
    let supervisors = supervisor_service::list_supervisors(&state.pool).await?;
    Ok(Json(ApiResponse::success(supervisors)))
}

/// Register a supervisor.
///
/// # Request Body
///
/// ```json
/// { "name": "J. Rivera", "badgeNumber": "b-1042" }
/// ```
///
/// Returns 201 Created; a duplicate badge number is rejected with 400.
pub async fn create_supervisor(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateSupervisorRequest>,
) -> Result<impl IntoResponse, AppError> {
    let supervisor = supervisor_service::create_supervisor(&state.pool, request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(supervisor))))
}

pub async fn get_supervisor(
    State(state): State<AppState>,
    ApiPath(supervisor_id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<Supervisor>>, AppError> {
    let supervisor = supervisor_service::get_supervisor(&state.pool, supervisor_id).await?;
    Ok(Json(ApiResponse::success(supervisor)))
}

pub async fn update_supervisor(
    State(state): State<AppState>,
    ApiPath(supervisor_id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<UpdateSupervisorRequest>,
) -> Result<Json<ApiResponse<Supervisor>>, AppError> {
    let supervisor =
        supervisor_service::update_supervisor(&state.pool, supervisor_id, request).await?;
    Ok(Json(ApiResponse::success(supervisor)))
}

pub async fn delete_supervisor(
    State(state): State<AppState>,
    ApiPath(supervisor_id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<Supervisor>>, AppError> {
    let supervisor = supervisor_service::delete_supervisor(&state.pool, supervisor_id).await?;
    Ok(Json(ApiResponse::success(supervisor)))
}
