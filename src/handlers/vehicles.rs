//! HTTP handlers for the vehicle roster.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use uuid::Uuid;

use crate::{
    error::AppError,
    extract::{ApiJson, ApiPath},
    models::{
        ApiResponse,
        vehicle::{CreateVehicleRequest, UpdateVehicleRequest, Vehicle},
    },
    services::{notification_service, vehicle_service},
    state::AppState,
};

/// List every vehicle, newest first.
pub async fn list_vehicles(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Vehicle>>>, AppError> {
    let vehicles = vehicle_service::list_vehicles(&state.pool).await?;
    Ok(Json(ApiResponse::success(vehicles)))
}

/// Register a vehicle.
///
/// # Request Body
///
/// ```json
/// { "name": "Patrol 1", "licensePlate": "abc-123", "isActive": true }
/// ```
///
/// Returns 201 Created. The plate is stored uppercased; a duplicate plate is
/// rejected with 400. Subscribers are told about the new vehicle.
pub async fn create_vehicle(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateVehicleRequest>,
) -> Result<impl IntoResponse, AppError> {
    let vehicle = vehicle_service::create_vehicle(&state.pool, request).await?;

    state
        .notifier
        .dispatch(notification_service::new_vehicle_payload(&vehicle.name));

    Ok((StatusCode::CREATED, Json(ApiResponse::success(vehicle))))
}

pub async fn get_vehicle(
    State(state): State<AppState>,
    ApiPath(vehicle_id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<Vehicle>>, AppError> {
    let vehicle = vehicle_service::get_vehicle(&state.pool, vehicle_id).await?;
    Ok(Json(ApiResponse::success(vehicle)))
}

/// Partial update; omitted fields keep their values.
pub async fn update_vehicle(
    State(state): State<AppState>,
    ApiPath(vehicle_id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<UpdateVehicleRequest>,
) -> Result<Json<ApiResponse<Vehicle>>, AppError> {
    let vehicle = vehicle_service::update_vehicle(&state.pool, vehicle_id, request).await?;
    Ok(Json(ApiResponse::success(vehicle)))
}

/// Remove a vehicle. Its mileage entries are kept.
pub async fn delete_vehicle(
    State(state): State<AppState>,
    ApiPath(vehicle_id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<Vehicle>>, AppError> {
    let vehicle = vehicle_service::delete_vehicle(&state.pool, vehicle_id).await?;
    Ok(Json(ApiResponse::success(vehicle)))
}
