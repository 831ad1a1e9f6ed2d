//! HTTP request handlers.
//!
//! Each handler extracts its input, calls one service operation and wraps
//! the result in the `ApiResponse` envelope. Errors render through `AppError`.

/// Service liveness and database connectivity
pub mod health;
pub mod mileage_entries;
pub mod notifications;
pub mod reports;
pub mod supervisors;
pub mod vehicles;
