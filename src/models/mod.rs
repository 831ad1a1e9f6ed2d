//! Data models representing database entities and API payloads.

use serde::Serialize;

/// Roster of vehicles
pub mod vehicle;
/// Roster of supervisors
pub mod supervisor;
/// Shift mileage entries and their enums
pub mod mileage_entry;
/// Read-only report projections
pub mod report;
/// Notification subscriptions and payloads
pub mod notification;

/// Response envelope shared by every endpoint.
///
/// ```json
/// { "success": true, "data": { ... } }
/// { "success": false, "error": "License plate already exists" }
/// ```
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}
