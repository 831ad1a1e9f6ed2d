//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to automatically deserialize environment variables into a type-safe struct.

use chrono::{FixedOffset, Offset, Utc};
use serde::Deserialize;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (required): PostgreSQL connection string
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `DATABASE_MAX_CONNECTIONS` (optional): pool size, defaults to 5
/// - `UTC_OFFSET_MINUTES` (optional): site-local offset used to classify shifts
///   and to pick calendar dates, defaults to 0
/// - `COVERAGE_WINDOW_DAYS` (optional): default daily coverage window, defaults to 7
/// - `ALLOW_ACTIVE_ENTRY_DELETION` (optional): defaults to false
/// - `CORS_ALLOWED_ORIGINS` (optional): comma-separated origins, empty = permissive
/// - `NOTIFICATIONS_ENABLED` (optional): defaults to true
/// - `NOTIFICATION_TIMEOUT_SECS` (optional): defaults to 5
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,

    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default = "default_max_connections")]
    pub database_max_connections: u32,

    #[serde(default)]
    pub utc_offset_minutes: i32,

    #[serde(default = "default_coverage_window")]
    pub coverage_window_days: u32,

    #[serde(default)]
    pub allow_active_entry_deletion: bool,

    #[serde(default)]
    pub cors_allowed_origins: String,

    #[serde(default = "default_true")]
    pub notifications_enabled: bool,

    #[serde(default = "default_notification_timeout")]
    pub notification_timeout_secs: u64,
}

/// Default port if SERVER_PORT environment variable is not set.
fn default_port() -> u16 {
    3000
}

fn default_max_connections() -> u32 {
    5
}

fn default_coverage_window() -> u32 {
    7
}

fn default_true() -> bool {
    true
}

fn default_notification_timeout() -> u64 {
    5
}

/// Longest coverage window a client may request.
pub const MAX_COVERAGE_WINDOW_DAYS: u32 = 92;

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables and deserializes them into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing (e.g., DATABASE_URL)
    /// - Environment variable values cannot be parsed into expected types
    /// - The site offset or coverage window is out of range
    pub fn from_env() -> anyhow::Result<Self> {
        // Try to load .env file if it exists (does nothing if not found)
        dotenvy::dotenv().ok();

        // Field names are automatically converted: database_url -> DATABASE_URL
        let config = envy::from_env::<Config>()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60)).is_none() {
            anyhow::bail!(
                "UTC_OFFSET_MINUTES out of range: {}",
                self.utc_offset_minutes
            );
        }
        if self.coverage_window_days == 0 || self.coverage_window_days > MAX_COVERAGE_WINDOW_DAYS {
            anyhow::bail!(
                "COVERAGE_WINDOW_DAYS must be between 1 and {}",
                MAX_COVERAGE_WINDOW_DAYS
            );
        }
        Ok(())
    }

    /// Site-local offset. Falls back to UTC, which `validate` rules out at startup.
    pub fn site_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60)).unwrap_or_else(|| Utc.fix())
    }

    /// Parsed `CORS_ALLOWED_ORIGINS`, blanks dropped.
    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            database_url: "postgres://localhost/shift_mileage_test".to_string(),
            server_port: 3000,
            database_max_connections: 5,
            utc_offset_minutes: 0,
            coverage_window_days: 7,
            allow_active_entry_deletion: false,
            cors_allowed_origins: String::new(),
            notifications_enabled: false,
            notification_timeout_secs: 5,
        }
    }

    #[test]
    fn test_site_offset_uses_minutes() {
        let mut config = test_config();
        config.utc_offset_minutes = -300;
        assert_eq!(config.site_offset().local_minus_utc(), -300 * 60);
    }

    #[test]
    fn test_validate_rejects_bad_window() {
        let mut config = test_config();
        config.coverage_window_days = 0;
        assert!(config.validate().is_err());
        config.coverage_window_days = MAX_COVERAGE_WINDOW_DAYS + 1;
        assert!(config.validate().is_err());
        config.coverage_window_days = 7;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_offset() {
        let mut config = test_config();
        config.utc_offset_minutes = 24 * 60;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cors_origins_split() {
        let mut config = test_config();
        config.cors_allowed_origins = "https://a.example, ,https://b.example".to_string();
        assert_eq!(
            config.cors_origins(),
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
    }
}
