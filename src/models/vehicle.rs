//! Vehicle roster models.
//!
//! - `Vehicle`: database entity, also the API representation
//! - `CreateVehicleRequest` / `UpdateVehicleRequest`: request bodies

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a vehicle record from the `vehicles` table.
///
/// `license_plate` is stored trimmed and upper-cased; the unique index on it
/// therefore makes plates unique case-insensitively.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: Uuid,

    /// Display label
    pub name: String,

    pub license_plate: String,

    /// Inactive vehicles cannot start new shifts but keep their history.
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for `POST /vehicles`.
///
/// ```json
/// { "name": "Patrol 1", "licensePlate": "abc-123", "isActive": true }
/// ```
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVehicleRequest {
    pub name: String,
    pub license_plate: String,

    /// Defaults to true
    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// Request body for `PUT /vehicles/{id}`. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVehicleRequest {
    pub name: Option<String>,
    pub license_plate: Option<String>,
    pub is_active: Option<bool>,
}

fn default_active() -> bool {
    true
}
