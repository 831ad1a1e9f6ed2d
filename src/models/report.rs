//! Report projection types.
//!
//! These are derived views only; nothing here is persisted.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Query string for `GET /reports/daily-coverage`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyCoverageQuery {
    /// Single vehicle; all roster vehicles when absent.
    pub vehicle_id: Option<Uuid>,

    /// Window length; the configured default when absent.
    pub days: Option<u32>,

    /// Last day of the window; site-local today when absent.
    pub end_date: Option<NaiveDate>,
}

/// One calendar day of a coverage report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayCoverage {
    pub date: NaiveDate,
    pub miles: i64,
    pub entry_count: usize,
    pub has_entry: bool,
    pub is_today: bool,
}

/// Trailing-window coverage of one vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleCoverage {
    pub vehicle_id: Uuid,
    pub vehicle_name: String,
    pub license_plate: String,

    /// Oldest day first
    pub days: Vec<DayCoverage>,

    pub missing_days: Vec<NaiveDate>,
    pub days_with_mileage: usize,

    /// Miles driven inside the window
    pub window_miles: i64,

    /// Miles over every completed entry of the vehicle
    pub all_time_miles: i64,
}

/// Period selector for the summary report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Today,
    Week,
    Month,
    #[default]
    All,
}

impl Period {
    /// First calendar day covered by the period, `None` for `All`.
    pub fn start_date(self, today: NaiveDate) -> Option<NaiveDate> {
        let span = match self {
            Period::Today => 1,
            Period::Week => 7,
            Period::Month => 30,
            Period::All => return None,
        };
        today.checked_sub_days(chrono::Days::new(span - 1))
    }
}

/// Query string for `GET /reports/summary`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryQuery {
    #[serde(default)]
    pub period: Period,
    pub vehicle_id: Option<Uuid>,
    pub supervisor_name: Option<String>,
}

/// First/second shift split over completed shifts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftDistribution {
    pub first: usize,
    pub second: usize,
    pub first_percentage: f64,
    pub second_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleBreakdown {
    pub vehicle_id: Uuid,

    /// `None` when the vehicle has since been deleted
    pub vehicle_name: Option<String>,

    pub shifts: usize,
    pub miles: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupervisorBreakdown {
    pub supervisor_name: String,
    pub shifts: usize,
    pub miles: i64,
}

/// Aggregate view over the entries matching a period and filters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodSummary {
    pub period: Period,
    pub total_shifts: usize,
    pub total_miles: i64,
    pub average_miles_per_shift: f64,
    pub active_shifts: usize,
    pub shift_distribution: ShiftDistribution,
    pub by_vehicle: Vec<VehicleBreakdown>,
    pub by_supervisor: Vec<SupervisorBreakdown>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_period_start_dates() {
        let today = date(2025, 3, 10);
        assert_eq!(Period::Today.start_date(today), Some(today));
        assert_eq!(Period::Week.start_date(today), Some(date(2025, 3, 4)));
        assert_eq!(Period::Month.start_date(today), Some(date(2025, 2, 9)));
        assert_eq!(Period::All.start_date(today), None);
    }

    #[test]
    fn test_period_parses_lowercase() {
        let query: SummaryQuery = serde_json::from_str(r#"{"period":"week"}"#).unwrap();
        assert_eq!(query.period, Period::Week);
        assert!(serde_json::from_str::<Period>("\"fortnight\"").is_err());
    }
}
