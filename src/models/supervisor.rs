//! Supervisor roster models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a supervisor record from the `supervisors` table.
///
/// Mileage entries keep a copy of the supervisor's name taken when the shift
/// started, so renaming or deleting a supervisor never rewrites history.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Supervisor {
    pub id: Uuid,
    pub name: String,

    /// Trimmed and upper-cased; unique across all supervisors.
    pub badge_number: String,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for `POST /supervisors`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSupervisorRequest {
    pub name: String,
    pub badge_number: String,

    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// Request body for `PUT /supervisors/{id}`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSupervisorRequest {
    pub name: Option<String>,
    pub badge_number: Option<String>,
    pub is_active: Option<bool>,
}

fn default_active() -> bool {
    true
}
