//! Shift mileage tracking service.
//!
//! The binary in `main.rs` wires configuration, the database pool and the
//! notifier into [`AppState`](state::AppState) and serves [`app`]. Integration
//! tests drive the services and router through this library.

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;

use axum::{
    Router,
    routing::{delete, get},
};

use crate::state::AppState;

/// Build the HTTP router with every route bound to `state`.
///
/// Tracing and CORS layers are added by the caller.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        // Rosters
        .route(
            "/vehicles",
            get(handlers::vehicles::list_vehicles).post(handlers::vehicles::create_vehicle),
        )
        .route(
            "/vehicles/{id}",
            get(handlers::vehicles::get_vehicle)
                .put(handlers::vehicles::update_vehicle)
                .delete(handlers::vehicles::delete_vehicle),
        )
        .route(
            "/supervisors",
            get(handlers::supervisors::list_supervisors)
                .post(handlers::supervisors::create_supervisor),
        )
        .route(
            "/supervisors/{id}",
            get(handlers::supervisors::get_supervisor)
                .put(handlers::supervisors::update_supervisor)
                .delete(handlers::supervisors::delete_supervisor),
        )
        // Shift lifecycle
        .route(
            "/mileage-entries",
            get(handlers::mileage_entries::list_entries)
                .post(handlers::mileage_entries::start_shift),
        )
        .route(
            "/mileage-entries/{id}",
            get(handlers::mileage_entries::get_entry)
                .put(handlers::mileage_entries::end_shift)
                .delete(handlers::mileage_entries::delete_entry),
        )
        // Reports
        .route(
            "/reports/daily-coverage",
            get(handlers::reports::daily_coverage),
        )
        .route("/reports/summary", get(handlers::reports::summary))
        // Notifications
        .route(
            "/notifications/subscribe",
            get(handlers::notifications::subscription_status)
                .post(handlers::notifications::subscribe),
        )
        .route(
            "/notifications/subscriptions/{id}",
            delete(handlers::notifications::unsubscribe),
        )
        .route(
            "/notifications/send",
            get(handlers::notifications::dispatcher_status).post(handlers::notifications::send),
        )
        .with_state(state)
}
