//! Shared helpers for the database-backed integration tests.
//!
//! These tests need a PostgreSQL instance. Point `TEST_DATABASE_URL` at a
//! scratch database; when it is unset every test returns early.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, Response},
};
use serde_json::Value;
use shift_mileage_server::{
    config::Config,
    db::{self, DbPool},
    models::{
        mileage_entry::StartShiftRequest,
        supervisor::CreateSupervisorRequest,
        vehicle::{CreateVehicleRequest, Vehicle},
    },
    services::{notification_service::Notifier, vehicle_service},
    state::AppState,
};
use uuid::Uuid;

/// Connect to `TEST_DATABASE_URL` and apply migrations.
pub async fn create_test_pool() -> Option<DbPool> {
    let Ok(database_url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set, skipping database test");
        return None;
    };

    let pool = db::create_pool(&database_url, 10)
        .await
        .expect("Failed to connect to test database");
    db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    Some(pool)
}

pub fn test_config() -> Config {
    Config {
        database_url: std::env::var("TEST_DATABASE_URL").unwrap_or_default(),
        server_port: 0,
        database_max_connections: 10,
        utc_offset_minutes: 0,
        coverage_window_days: 7,
        allow_active_entry_deletion: false,
        cors_allowed_origins: String::new(),
        notifications_enabled: false,
        notification_timeout_secs: 1,
    }
}

pub fn create_test_app(pool: DbPool) -> Router {
    let config = test_config();
    let notifier = Notifier::new(pool.clone(), &config).expect("Failed to build notifier");
    shift_mileage_server::app(AppState {
        pool,
        config: Arc::new(config),
        notifier,
    })
}

/// A short random key, unique per call, that fits plate and badge limits.
pub fn unique_key(prefix: &str) -> String {
    format!("{prefix}-{}", &Uuid::new_v4().simple().to_string()[..12])
}

pub async fn create_vehicle(pool: &DbPool, license_plate: &str) -> Vehicle {
    vehicle_service::create_vehicle(
        pool,
        CreateVehicleRequest {
            name: "Patrol".to_string(),
            license_plate: license_plate.to_string(),
            is_active: true,
        },
    )
    .await
    .expect("Failed to create vehicle")
}

pub fn supervisor_request(badge_number: &str) -> CreateSupervisorRequest {
    CreateSupervisorRequest {
        name: "J. Rivera".to_string(),
        badge_number: badge_number.to_string(),
        is_active: true,
    }
}

pub fn start_request(vehicle_id: Uuid, start_mileage: i64) -> StartShiftRequest {
    StartShiftRequest {
        vehicle_id,
        supervisor_name: unique_key("Guard"),
        start_mileage,
        shift: None,
        notes: None,
        start_condition: None,
        start_condition_notes: None,
        start_photos: Default::default(),
    }
}

/// Remove a vehicle and every entry that references it.
pub async fn cleanup_vehicle(pool: &DbPool, vehicle_id: Uuid) {
    sqlx::query("DELETE FROM mileage_entries WHERE vehicle_id = $1")
        .bind(vehicle_id)
        .execute(pool)
        .await
        .expect("Failed to clean up entries");
    sqlx::query("DELETE FROM vehicles WHERE id = $1")
        .bind(vehicle_id)
        .execute(pool)
        .await
        .expect("Failed to clean up vehicle");
}

pub fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn parse_response_body(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
