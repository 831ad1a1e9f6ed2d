//! Shift lifecycle service - the single authority for creating and
//! completing mileage entries.
//!
//! # State Machine
//!
//! ```text
//!   (none) --StartShift--> active --EndShift--> completed
//! ```
//!
//! There are no other transitions: completed entries are never reopened and
//! nothing happens on a timer.
//!
//! # Concurrency
//!
//! Every operation is a single-row write. The "one active shift per vehicle"
//! rule is checked before inserting and enforced by a partial unique index,
//! so concurrent StartShift calls for one vehicle cannot both succeed.
//! EndShift writes with `WHERE status = 'active'`, so two concurrent
//! completions resolve to one success and one `NotFound`.

use chrono::{DateTime, FixedOffset, NaiveDate, Timelike, Utc};
use sqlx::types::Json;
use uuid::Uuid;

use crate::{
    config::Config,
    db::DbPool,
    error::AppError,
    models::mileage_entry::{
        EndShiftRequest, InspectionPhotos, ListEntriesQuery, MileageEntry, ShiftKind,
        StartShiftRequest, VehicleCondition,
    },
    services::{supervisor_service, vehicle_service},
};

pub const MAX_NOTES_LEN: usize = 500;
pub const MAX_CONDITION_NOTES_LEN: usize = 200;
pub const MAX_SUPERVISOR_NAME_LEN: usize = 100;

/// First-shift hours are `[FIRST_SHIFT_START_HOUR, SECOND_SHIFT_START_HOUR)` local time.
const FIRST_SHIFT_START_HOUR: u32 = 5;
const SECOND_SHIFT_START_HOUR: u32 = 17;

const ACTIVE_SHIFT_EXISTS: &str = "Vehicle already has an active shift";

/// Classify a start instant: 05:00-16:59 site-local is `First`, otherwise `Second`.
pub fn classify_shift(start: DateTime<Utc>, offset: FixedOffset) -> ShiftKind {
    let hour = start.with_timezone(&offset).hour();
    if (FIRST_SHIFT_START_HOUR..SECOND_SHIFT_START_HOUR).contains(&hour) {
        ShiftKind::First
    } else {
        ShiftKind::Second
    }
}

/// Site-local calendar day of an instant.
pub fn local_date(instant: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    instant.with_timezone(&offset).date_naive()
}

/// Validated field set for a new `active` entry.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    pub vehicle_id: Uuid,
    pub supervisor_name: String,
    pub shift: ShiftKind,
    pub date: NaiveDate,
    pub start_time: DateTime<Utc>,
    pub start_mileage: i64,
    pub notes: Option<String>,
    pub start_condition: Option<VehicleCondition>,
    pub start_condition_notes: Option<String>,
    pub start_photos: InspectionPhotos,
}

/// Validate a StartShift request and derive `shift`, `date` and `start_time`.
pub fn prepare_start(
    request: StartShiftRequest,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> Result<NewEntry, AppError> {
    let supervisor_name = request.supervisor_name.trim();
    if supervisor_name.is_empty() {
        return Err(AppError::Validation("Supervisor name is required".to_string()));
    }
    if supervisor_name.chars().count() > MAX_SUPERVISOR_NAME_LEN {
        return Err(AppError::Validation(format!(
            "Supervisor name cannot exceed {MAX_SUPERVISOR_NAME_LEN} characters"
        )));
    }
    if request.start_mileage < 0 {
        return Err(AppError::Validation(
            "Start mileage cannot be negative".to_string(),
        ));
    }

    Ok(NewEntry {
        vehicle_id: request.vehicle_id,
        supervisor_name: supervisor_name.to_string(),
        shift: request.shift.unwrap_or_else(|| classify_shift(now, offset)),
        date: local_date(now, offset),
        start_time: now,
        start_mileage: request.start_mileage,
        notes: optional_text(request.notes, MAX_NOTES_LEN, "Notes")?,
        start_condition: request.start_condition,
        start_condition_notes: optional_text(
            request.start_condition_notes,
            MAX_CONDITION_NOTES_LEN,
            "Start condition notes",
        )?,
        start_photos: request.start_photos,
    })
}

/// End-of-shift fields, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub end_time: DateTime<Utc>,
    pub end_mileage: i64,
    pub total_miles: i64,
    pub notes: Option<String>,
    pub end_condition: Option<VehicleCondition>,
    pub end_condition_notes: Option<String>,
    pub end_photos: InspectionPhotos,
}

/// Validate an EndShift request against the stored entry.
///
/// `total_miles` is always recomputed here from the two readings.
///
/// # Errors
///
/// - `NotFound`: the entry is already completed
/// - `Validation`: `end_mileage < start_mileage`, or over-long text
pub fn prepare_completion(
    entry: &MileageEntry,
    request: EndShiftRequest,
    now: DateTime<Utc>,
) -> Result<Completion, AppError> {
    if !entry.is_active() {
        return Err(AppError::NotFound(
            "Mileage entry not found or already completed".to_string(),
        ));
    }
    if request.end_mileage < entry.start_mileage {
        return Err(AppError::Validation(format!(
            "End mileage ({}) cannot be less than start mileage ({})",
            request.end_mileage, entry.start_mileage
        )));
    }

    // Non-blank notes replace the stored ones; otherwise keep what is there.
    let notes = match optional_text(request.notes, MAX_NOTES_LEN, "Notes")? {
        Some(notes) => Some(notes),
        None => entry.notes.clone(),
    };

    Ok(Completion {
        end_time: now,
        end_mileage: request.end_mileage,
        total_miles: request.end_mileage - entry.start_mileage,
        notes,
        end_condition: request.end_condition,
        end_condition_notes: optional_text(
            request.end_condition_notes,
            MAX_CONDITION_NOTES_LEN,
            "End condition notes",
        )?,
        end_photos: request.end_photos,
    })
}

/// Whether an entry may be deleted under the current policy.
pub fn check_deletable(entry: &MileageEntry, allow_active: bool) -> Result<(), AppError> {
    if entry.is_active() && !allow_active {
        return Err(AppError::Validation(
            "Active shifts cannot be deleted; end the shift first".to_string(),
        ));
    }
    Ok(())
}

/// Trim optional free text; blank becomes `None`.
fn optional_text(
    value: Option<String>,
    max_len: usize,
    field: &str,
) -> Result<Option<String>, AppError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    if value.chars().count() > max_len {
        return Err(AppError::Validation(format!(
            "{field} cannot exceed {max_len} characters"
        )));
    }
    Ok(Some(value.to_string()))
}

/// List entries, newest first, optionally filtered by status and vehicle.
pub async fn list_entries(
    pool: &DbPool,
    query: &ListEntriesQuery,
) -> Result<Vec<MileageEntry>, AppError> {
    let entries = sqlx::query_as::<_, MileageEntry>(
        r#"
        SELECT * FROM mileage_entries
        WHERE ($1::entry_status IS NULL OR status = $1)
        AND ($2::uuid IS NULL OR vehicle_id = $2)
        ORDER BY created_at DESC
        "#,
    )
    .bind(query.status)
    .bind(query.vehicle_id)
    .fetch_all(pool)
    .await?;

    Ok(entries)
}

pub async fn get_entry(pool: &DbPool, entry_id: Uuid) -> Result<MileageEntry, AppError> {
    sqlx::query_as::<_, MileageEntry>("SELECT * FROM mileage_entries WHERE id = $1")
        .bind(entry_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Mileage entry not found".to_string()))
}

/// StartShift: open a new `active` entry.
///
/// # Process
///
/// 1. Validate fields and derive shift/date from the current time
/// 2. Reject an inactive vehicle or a supervisor name known only as inactive
///    (unknown references are accepted and logged)
/// 3. Reject when the vehicle already has an active shift
/// 4. Insert; a unique violation from a concurrent start becomes `Conflict`
pub async fn start_shift(
    pool: &DbPool,
    config: &Config,
    request: StartShiftRequest,
) -> Result<MileageEntry, AppError> {
    let new_entry = prepare_start(request, Utc::now(), config.site_offset())?;

    match vehicle_service::vehicle_activity(pool, new_entry.vehicle_id).await? {
        Some(true) => {}
        Some(false) => {
            return Err(AppError::Validation(
                "Vehicle is inactive and cannot start a shift".to_string(),
            ));
        }
        None => {
            tracing::warn!(vehicle_id = %new_entry.vehicle_id, "starting shift for unknown vehicle");
        }
    }

    match supervisor_service::name_activity(pool, &new_entry.supervisor_name).await? {
        Some(true) => {}
        Some(false) => {
            return Err(AppError::Validation(
                "Supervisor is inactive and cannot start a shift".to_string(),
            ));
        }
        None => {
            tracing::warn!(supervisor = %new_entry.supervisor_name, "starting shift for unlisted supervisor");
        }
    }

    let has_active: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM mileage_entries WHERE vehicle_id = $1 AND status = 'active')",
    )
    .bind(new_entry.vehicle_id)
    .fetch_one(pool)
    .await?;

    if has_active {
        return Err(AppError::Conflict(ACTIVE_SHIFT_EXISTS.to_string()));
    }

    let entry = sqlx::query_as::<_, MileageEntry>(
        r#"
        INSERT INTO mileage_entries (
            vehicle_id,
            supervisor_name,
            shift,
            date,
            start_time,
            start_mileage,
            notes,
            status,
            start_condition,
            start_condition_notes,
            start_photos
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, 'active', $8, $9, $10)
        RETURNING *
        "#,
    )
    .bind(new_entry.vehicle_id)
    .bind(&new_entry.supervisor_name)
    .bind(new_entry.shift)
    .bind(new_entry.date)
    .bind(new_entry.start_time)
    .bind(new_entry.start_mileage)
    .bind(&new_entry.notes)
    .bind(new_entry.start_condition)
    .bind(&new_entry.start_condition_notes)
    .bind(Json(&new_entry.start_photos))
    .fetch_one(pool)
    .await
    .map_err(|e| AppError::conflict_on_unique(e, ACTIVE_SHIFT_EXISTS))?;

    tracing::info!(
        entry_id = %entry.id,
        vehicle_id = %entry.vehicle_id,
        shift = ?entry.shift,
        start_mileage = entry.start_mileage,
        photos = entry.start_photos.captured(),
        "shift started"
    );

    Ok(entry)
}

/// EndShift: complete an `active` entry.
///
/// # Errors
///
/// - `NotFound`: no such entry, already completed, or completed concurrently
/// - `Validation`: `end_mileage < start_mileage`
pub async fn end_shift(
    pool: &DbPool,
    entry_id: Uuid,
    request: EndShiftRequest,
) -> Result<MileageEntry, AppError> {
    let entry = get_entry(pool, entry_id).await?;
    let completion = prepare_completion(&entry, request, Utc::now())?;

    let entry = sqlx::query_as::<_, MileageEntry>(
        r#"
        UPDATE mileage_entries
        SET end_time = $2,
            end_mileage = $3,
            total_miles = $4,
            notes = $5,
            end_condition = $6,
            end_condition_notes = $7,
            end_photos = $8,
            status = 'completed',
            updated_at = NOW()
        WHERE id = $1 AND status = 'active'
        RETURNING *
        "#,
    )
    .bind(entry_id)
    .bind(completion.end_time)
    .bind(completion.end_mileage)
    .bind(completion.total_miles)
    .bind(&completion.notes)
    .bind(completion.end_condition)
    .bind(&completion.end_condition_notes)
    .bind(Json(&completion.end_photos))
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Mileage entry not found or already completed".to_string()))?;

    tracing::info!(
        entry_id = %entry.id,
        vehicle_id = %entry.vehicle_id,
        total_miles = ?entry.total_miles,
        "shift completed"
    );

    Ok(entry)
}

/// DeleteEntry: permanent removal, returns the removed record.
pub async fn delete_entry(
    pool: &DbPool,
    entry_id: Uuid,
    allow_active: bool,
) -> Result<MileageEntry, AppError> {
    let entry = get_entry(pool, entry_id).await?;
    check_deletable(&entry, allow_active)?;

    let deleted = sqlx::query_as::<_, MileageEntry>(
        r#"
        DELETE FROM mileage_entries
        WHERE id = $1 AND ($2 OR status = 'completed')
        RETURNING *
        "#,
    )
    .bind(entry_id)
    .bind(allow_active)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Mileage entry not found".to_string()))?;

    tracing::info!(entry_id = %deleted.id, status = ?deleted.status, "mileage entry deleted");

    Ok(deleted)
}
