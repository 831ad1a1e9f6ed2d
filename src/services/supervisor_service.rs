//! Supervisor roster service. Same lifecycle as vehicles, keyed by badge number.

use uuid::Uuid;

use crate::{
    db::DbPool,
    error::AppError,
    models::supervisor::{CreateSupervisorRequest, Supervisor, UpdateSupervisorRequest},
    services::roster::{RosterFields, normalize_key, normalize_name},
};

const BADGE_TAKEN: &str = "Badge number already exists";

pub async fn list_supervisors(pool: &DbPool) -> Result<Vec<Supervisor>, AppError> {
    let supervisors =
        sqlx::query_as::<_, Supervisor>("SELECT * FROM supervisors ORDER BY created_at DESC")
            .fetch_all(pool)
            .await?;

    Ok(supervisors)
}

pub async fn get_supervisor(pool: &DbPool, supervisor_id: Uuid) -> Result<Supervisor, AppError> {
    sqlx::query_as::<_, Supervisor>("SELECT * FROM supervisors WHERE id = $1")
        .bind(supervisor_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Supervisor not found".to_string()))
}

pub async fn create_supervisor(
    pool: &DbPool,
    request: CreateSupervisorRequest,
) -> Result<Supervisor, AppError> {
    let name = normalize_name(&request.name, "Supervisor name")?;
    let badge_number = normalize_key(&request.badge_number, "Badge number")?;

    if badge_taken(pool, &badge_number, None).await? {
        return Err(AppError::Conflict(BADGE_TAKEN.to_string()));
    }

    let supervisor = sqlx::query_as::<_, Supervisor>(
        r#"
        INSERT INTO supervisors (name, badge_number, is_active)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(&name)
    .bind(&badge_number)
    .bind(request.is_active)
    .fetch_one(pool)
    .await
    .map_err(|e| AppError::conflict_on_unique(e, BADGE_TAKEN))?;

    tracing::info!(supervisor_id = %supervisor.id, badge = %supervisor.badge_number, "supervisor created");

    Ok(supervisor)
}

pub async fn update_supervisor(
    pool: &DbPool,
    supervisor_id: Uuid,
    request: UpdateSupervisorRequest,
) -> Result<Supervisor, AppError> {
    let current = get_supervisor(pool, supervisor_id).await?;

    let fields = RosterFields::merge(
        RosterFields {
            name: current.name,
            key: current.badge_number.clone(),
            is_active: current.is_active,
        },
        request.name.as_deref(),
        request.badge_number.as_deref(),
        request.is_active,
        "Supervisor name",
        "Badge number",
    )?;

    if fields.key != current.badge_number
        && badge_taken(pool, &fields.key, Some(supervisor_id)).await?
    {
        return Err(AppError::Conflict(BADGE_TAKEN.to_string()));
    }

    let supervisor = sqlx::query_as::<_, Supervisor>(
        r#"
        UPDATE supervisors
        SET name = $2, badge_number = $3, is_active = $4, updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(supervisor_id)
    .bind(&fields.name)
    .bind(&fields.key)
    .bind(fields.is_active)
    .fetch_optional(pool)
    .await
    .map_err(|e| AppError::conflict_on_unique(e, BADGE_TAKEN))?
    .ok_or_else(|| AppError::NotFound("Supervisor not found".to_string()))?;

    tracing::info!(supervisor_id = %supervisor.id, is_active = supervisor.is_active, "supervisor updated");

    Ok(supervisor)
}

pub async fn delete_supervisor(pool: &DbPool, supervisor_id: Uuid) -> Result<Supervisor, AppError> {
    let supervisor =
        sqlx::query_as::<_, Supervisor>("DELETE FROM supervisors WHERE id = $1 RETURNING *")
            .bind(supervisor_id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Supervisor not found".to_string()))?;

    tracing::info!(supervisor_id = %supervisor.id, "supervisor deleted");

    Ok(supervisor)
}

/// Roster status of a supervisor name (case-insensitive).
///
/// - `Some(true)`: at least one active supervisor has this name
/// - `Some(false)`: the name exists only on inactive supervisors
/// - `None`: no supervisor has this name
pub async fn name_activity(pool: &DbPool, name: &str) -> Result<Option<bool>, AppError> {
    let any_active: Option<bool> =
        sqlx::query_scalar("SELECT bool_or(is_active) FROM supervisors WHERE lower(name) = lower($1)")
            .bind(name)
            .fetch_one(pool)
            .await?;

    Ok(any_active)
}

async fn badge_taken(
    pool: &DbPool,
    badge_number: &str,
    excluding: Option<Uuid>,
) -> Result<bool, AppError> {
    let taken: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM supervisors
            WHERE badge_number = $1
            AND ($2::uuid IS NULL OR id <> $2)
        )
        "#,
    )
    .bind(badge_number)
    .bind(excluding)
    .fetch_one(pool)
    .await?;

    Ok(taken)
}
