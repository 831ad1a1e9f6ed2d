//! Business logic services.
//!
//! Services hold the lifecycle rules and queries; handlers only translate
//! HTTP in and out of them. Pure decision functions live next to the
//! queries that use them so they can be tested without a database.

pub mod notification_service;
pub mod report_service;
pub mod roster;
pub mod shift_service;
pub mod supervisor_service;
pub mod vehicle_service;
