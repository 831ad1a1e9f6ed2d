//! Mileage entry models.
//!
//! A `MileageEntry` is one shift: opened by `StartShift` in the `active`
//! state, closed exactly once by `EndShift` into `completed`.
//!
//! This module defines:
//! - the shift / status / condition enums (Postgres enum types)
//! - `InspectionPhotos`: the six optional photo slots
//! - `MileageEntry`: database entity
//! - `MileageEntryResponse`: API representation
//! - request bodies for starting and ending a shift

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

/// Shift classification, fixed when the entry is created.
///
/// - `first`: started between 05:00 and 16:59 site-local time
/// - `second`: any other start time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "shift_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ShiftKind {
    First,
    Second,
}

/// Entry lifecycle state. The only transition is `Active -> Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "entry_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Active,
    Completed,
}

/// Qualitative vehicle state reported at shift start and end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "vehicle_condition", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum VehicleCondition {
    Excellent,
    Good,
    Fair,
    Poor,
    NeedsAttention,
}

/// Inspection photos keyed by camera position. Each slot holds an opaque
/// image reference (URL or data URI).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionPhotos {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_side: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_side: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front_interior: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back_interior: Option<String>,
}

impl InspectionPhotos {
    /// Number of positions with a photo.
    pub fn captured(&self) -> usize {
        [
            &self.front,
            &self.back,
            &self.left_side,
            &self.right_side,
            &self.front_interior,
            &self.back_interior,
        ]
        .iter()
        .filter(|slot| slot.is_some())
        .count()
    }
}

/// Represents a row of the `mileage_entries` table.
///
/// # Invariants (enforced by the service and by CHECK constraints)
///
/// - `end_mileage >= start_mileage` whenever `end_mileage` is set
/// - `total_miles == end_mileage - start_mileage`, computed server-side
/// - `status == Completed` exactly when the end fields are populated
/// - at most one `Active` entry per `vehicle_id` (partial unique index)
///
/// `vehicle_id` is not a foreign key; it may outlive the vehicle it names.
/// `supervisor_name` is a snapshot, not a reference.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MileageEntry {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub supervisor_name: String,
    pub shift: ShiftKind,

    /// Site-local calendar day the shift opened
    pub date: NaiveDate,

    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub start_mileage: i64,
    pub end_mileage: Option<i64>,
    pub total_miles: Option<i64>,
    pub notes: Option<String>,
    pub status: EntryStatus,
    pub start_condition: Option<VehicleCondition>,
    pub start_condition_notes: Option<String>,
    pub end_condition: Option<VehicleCondition>,
    pub end_condition_notes: Option<String>,
    pub start_photos: Json<InspectionPhotos>,
    pub end_photos: Json<InspectionPhotos>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MileageEntry {
    pub fn is_active(&self) -> bool {
        self.status == EntryStatus::Active
    }

    pub fn is_completed(&self) -> bool {
        self.status == EntryStatus::Completed
    }
}

/// Request body for `POST /mileage-entries` (start a shift).
///
/// ```json
/// {
///   "vehicleId": "550e8400-e29b-41d4-a716-446655440000",
///   "supervisorName": "J. Rivera",
///   "startMileage": 1000,
///   "startCondition": "good",
///   "notes": "Fuel low at start",
///   "startPhotos": { "front": "https://cdn.example/p/1.jpg" }
/// }
/// ```
///
/// `shift` may be supplied; otherwise it is derived from the start time.
/// `notes` opened here are kept unless the end of the shift replaces them.
/// Any other fields a client sends (end readings, totals, status) are ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartShiftRequest {
    pub vehicle_id: Uuid,
    pub supervisor_name: String,
    pub start_mileage: i64,
    pub shift: Option<ShiftKind>,
    pub notes: Option<String>,
    pub start_condition: Option<VehicleCondition>,
    pub start_condition_notes: Option<String>,
    #[serde(default)]
    pub start_photos: InspectionPhotos,
}

/// Request body for `PUT /mileage-entries/{id}` (end a shift).
///
/// ```json
/// { "endMileage": 1050, "notes": "Quiet night", "endCondition": "good" }
/// ```
///
/// A client-sent `totalMiles` is never read.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndShiftRequest {
    pub end_mileage: i64,
    pub notes: Option<String>,
    pub end_condition: Option<VehicleCondition>,
    pub end_condition_notes: Option<String>,
    #[serde(default)]
    pub end_photos: InspectionPhotos,
}

/// Query string for `GET /mileage-entries`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEntriesQuery {
    pub status: Option<EntryStatus>,
    pub vehicle_id: Option<Uuid>,
}

/// API representation of a mileage entry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MileageEntryResponse {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub supervisor_name: String,
    pub shift: ShiftKind,
    pub date: NaiveDate,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub start_mileage: i64,
    pub end_mileage: Option<i64>,
    pub total_miles: Option<i64>,
    pub notes: Option<String>,
    pub status: EntryStatus,
    pub start_condition: Option<VehicleCondition>,
    pub start_condition_notes: Option<String>,
    pub end_condition: Option<VehicleCondition>,
    pub end_condition_notes: Option<String>,
    pub start_photos: InspectionPhotos,
    pub end_photos: InspectionPhotos,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<MileageEntry> for MileageEntryResponse {
    fn from(entry: MileageEntry) -> Self {
        Self {
            id: entry.id,
            vehicle_id: entry.vehicle_id,
            supervisor_name: entry.supervisor_name,
            shift: entry.shift,
            date: entry.date,
            start_time: entry.start_time,
            end_time: entry.end_time,
            start_mileage: entry.start_mileage,
            end_mileage: entry.end_mileage,
            total_miles: entry.total_miles,
            notes: entry.notes,
            status: entry.status,
            start_condition: entry.start_condition,
            start_condition_notes: entry.start_condition_notes,
            end_condition: entry.end_condition,
            end_condition_notes: entry.end_condition_notes,
            start_photos: entry.start_photos.0,
            end_photos: entry.end_photos.0,
            created_at: entry.created_at,
            updated_at: entry.updated_at,
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::TimeZone;

    /// An `active` first-shift entry opened 2025-03-10 08:00 UTC.
    pub fn active_entry(start_mileage: i64) -> MileageEntry {
        let start_time = Utc.with_ymd_and_hms(2025, 3, 10, 8, 0, 0).unwrap();
        MileageEntry {
            id: Uuid::new_v4(),
            vehicle_id: Uuid::new_v4(),
            supervisor_name: "J. Rivera".to_string(),
            shift: ShiftKind::First,
            date: start_time.date_naive(),
            start_time,
            end_time: None,
            start_mileage,
            end_mileage: None,
            total_miles: None,
            notes: None,
            status: EntryStatus::Active,
            start_condition: None,
            start_condition_notes: None,
            end_condition: None,
            end_condition_notes: None,
            start_photos: Json(InspectionPhotos::default()),
            end_photos: Json(InspectionPhotos::default()),
            created_at: start_time,
            updated_at: start_time,
        }
    }

    /// A `completed` entry for `vehicle_id` on `date`.
    pub fn completed_entry(
        vehicle_id: Uuid,
        supervisor_name: &str,
        shift: ShiftKind,
        date: NaiveDate,
        miles: i64,
    ) -> MileageEntry {
        let mut entry = active_entry(10_000);
        entry.vehicle_id = vehicle_id;
        entry.supervisor_name = supervisor_name.to_string();
        entry.shift = shift;
        entry.date = date;
        entry.end_time = Some(entry.start_time);
        entry.end_mileage = Some(10_000 + miles);
        entry.total_miles = Some(miles);
        entry.status = EntryStatus::Completed;
        entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_carries_photos_and_totals() {
        let entry = fixtures::completed_entry(
            Uuid::new_v4(),
            "J. Rivera",
            ShiftKind::Second,
            NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            50,
        );
        let json = serde_json::to_value(MileageEntryResponse::from(entry)).unwrap();

        assert_eq!(json["status"], "completed");
        assert_eq!(json["shift"], "second");
        assert_eq!(json["totalMiles"], 50);
        assert_eq!(json["date"], "2025-03-10");
        assert!(json["startPhotos"].is_object());
    }

    #[test]
    fn test_condition_wire_names() {
        let json = serde_json::to_string(&VehicleCondition::NeedsAttention).unwrap();
        assert_eq!(json, "\"needs_attention\"");
        let parsed: VehicleCondition = serde_json::from_str("\"excellent\"").unwrap();
        assert_eq!(parsed, VehicleCondition::Excellent);
    }

    #[test]
    fn test_photos_use_position_keys() {
        let photos: InspectionPhotos = serde_json::from_str(
            r#"{"front":"a.jpg","leftSide":"b.jpg","backInterior":"c.jpg"}"#,
        )
        .unwrap();
        assert_eq!(photos.left_side.as_deref(), Some("b.jpg"));
        assert_eq!(photos.captured(), 3);

        let json = serde_json::to_value(&photos).unwrap();
        assert!(json.get("rightSide").is_none());
        assert_eq!(json["backInterior"], "c.jpg");
    }

    #[test]
    fn test_start_request_ignores_client_totals() {
        let request: StartShiftRequest = serde_json::from_str(
            r#"{
                "vehicleId": "550e8400-e29b-41d4-a716-446655440000",
                "supervisorName": "J. Rivera",
                "startMileage": 1000,
                "totalMiles": 999,
                "status": "completed"
            }"#,
        )
        .unwrap();
        assert_eq!(request.start_mileage, 1000);
        assert!(request.shift.is_none());
        assert!(request.notes.is_none());
        assert_eq!(request.start_photos, InspectionPhotos::default());
    }

    #[test]
    fn test_start_request_reads_notes() {
        let request: StartShiftRequest = serde_json::from_str(
            r#"{
                "vehicleId": "550e8400-e29b-41d4-a716-446655440000",
                "supervisorName": "A",
                "startMileage": 1,
                "notes": "Fuel low at start"
            }"#,
        )
        .unwrap();
        assert_eq!(request.notes.as_deref(), Some("Fuel low at start"));
    }

    #[test]
    fn test_unknown_condition_is_rejected() {
        let result: Result<EndShiftRequest, _> =
            serde_json::from_str(r#"{"endMileage": 10, "endCondition": "broken"}"#);
        assert!(result.is_err());
    }
}
