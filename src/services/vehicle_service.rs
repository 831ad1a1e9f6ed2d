//! Vehicle roster service.
//!
//! License plates are unique across active and inactive vehicles. The
//! service checks before writing and the unique index catches races.
//! Deleting a vehicle never touches mileage entries.

use uuid::Uuid;

use crate::{
    db::DbPool,
    error::AppError,
    models::vehicle::{CreateVehicleRequest, UpdateVehicleRequest, Vehicle},
    services::roster::{RosterFields, normalize_key, normalize_name},
};

const PLATE_TAKEN: &str = "License plate already exists";

/// All vehicles, newest first.
pub async fn list_vehicles(pool: &DbPool) -> Result<Vec<Vehicle>, AppError> {
    let vehicles = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles ORDER BY created_at DESC")
        .fetch_all(pool)
        .await?;

    Ok(vehicles)
}

pub async fn find_vehicle(pool: &DbPool, vehicle_id: Uuid) -> Result<Option<Vehicle>, AppError> {
    let vehicle = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1")
        .bind(vehicle_id)
        .fetch_optional(pool)
        .await?;

    Ok(vehicle)
}

pub async fn get_vehicle(pool: &DbPool, vehicle_id: Uuid) -> Result<Vehicle, AppError> {
    find_vehicle(pool, vehicle_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))
}

/// Create a vehicle.
///
/// # Errors
///
/// - `Validation`: blank or over-long name / plate
/// - `Conflict`: plate already used by any vehicle
pub async fn create_vehicle(
    pool: &DbPool,
    request: CreateVehicleRequest,
) -> Result<Vehicle, AppError> {
    let name = normalize_name(&request.name, "Vehicle name")?;
    let license_plate = normalize_key(&request.license_plate, "License plate")?;

    if plate_taken(pool, &license_plate, None).await? {
        return Err(AppError::Conflict(PLATE_TAKEN.to_string()));
    }

    let vehicle = sqlx::query_as::<_, Vehicle>(
        r#"
        INSERT INTO vehicles (name, license_plate, is_active)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(&name)
    .bind(&license_plate)
    .bind(request.is_active)
    .fetch_one(pool)
    .await
    .map_err(|e| AppError::conflict_on_unique(e, PLATE_TAKEN))?;

    tracing::info!(vehicle_id = %vehicle.id, plate = %vehicle.license_plate, "vehicle created");

    Ok(vehicle)
}

/// Apply a partial update. Changing the plate re-runs the uniqueness check.
pub async fn update_vehicle(
    pool: &DbPool,
    vehicle_id: Uuid,
    request: UpdateVehicleRequest,
) -> Result<Vehicle, AppError> {
    let current = get_vehicle(pool, vehicle_id).await?;

    let fields = RosterFields::merge(
        RosterFields {
            name: current.name,
            key: current.license_plate.clone(),
            is_active: current.is_active,
        },
        request.name.as_deref(),
        request.license_plate.as_deref(),
        request.is_active,
        "Vehicle name",
        "License plate",
    )?;

    if fields.key != current.license_plate && plate_taken(pool, &fields.key, Some(vehicle_id)).await? {
        return Err(AppError::Conflict(PLATE_TAKEN.to_string()));
    }

    let vehicle = sqlx::query_as::<_, Vehicle>(
        r#"
        UPDATE vehicles
        SET name = $2, license_plate = $3, is_active = $4, updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(vehicle_id)
    .bind(&fields.name)
    .bind(&fields.key)
    .bind(fields.is_active)
    .fetch_optional(pool)
    .await
    .map_err(|e| AppError::conflict_on_unique(e, PLATE_TAKEN))?
    // Deleted between the read and the write
    .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;

    tracing::info!(vehicle_id = %vehicle.id, is_active = vehicle.is_active, "vehicle updated");

    Ok(vehicle)
}

/// Remove a vehicle permanently and return the removed record.
///
/// Entries referencing the vehicle keep their `vehicle_id`.
pub async fn delete_vehicle(pool: &DbPool, vehicle_id: Uuid) -> Result<Vehicle, AppError> {
    let vehicle = sqlx::query_as::<_, Vehicle>("DELETE FROM vehicles WHERE id = $1 RETURNING *")
        .bind(vehicle_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;

    tracing::info!(vehicle_id = %vehicle.id, "vehicle deleted");

    Ok(vehicle)
}

/// `Some(is_active)` for a known vehicle, `None` for an unknown id.
pub async fn vehicle_activity(pool: &DbPool, vehicle_id: Uuid) -> Result<Option<bool>, AppError> {
    let is_active = sqlx::query_scalar::<_, bool>("SELECT is_active FROM vehicles WHERE id = $1")
        .bind(vehicle_id)
        .fetch_optional(pool)
        .await?;

    Ok(is_active)
}

async fn plate_taken(
    pool: &DbPool,
    license_plate: &str,
    excluding: Option<Uuid>,
) -> Result<bool, AppError> {
    let taken: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM vehicles
            WHERE license_plate = $1
            AND ($2::uuid IS NULL OR id <> $2)
        )
        "#,
    )
    .bind(license_plate)
    .bind(excluding)
    .fetch_one(pool)
    .await?;

    Ok(taken)
}
