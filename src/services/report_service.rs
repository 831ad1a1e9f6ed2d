//! Reporting projections over mileage entries.
//!
//! `daily_coverage` and `period_summary` are pure: they read only the slices
//! they are given plus an explicit `today`, so identical inputs always give
//! identical output regardless of entry order. The async wrappers load the
//! collections and pick `today` in site-local time.

use std::collections::HashMap;

use chrono::{Days, NaiveDate, Utc};
use uuid::Uuid;

use crate::{
    config::{Config, MAX_COVERAGE_WINDOW_DAYS},
    db::DbPool,
    error::AppError,
    models::{
        mileage_entry::{MileageEntry, ShiftKind},
        report::{
            DailyCoverageQuery, DayCoverage, PeriodSummary, ShiftDistribution, SummaryQuery,
            SupervisorBreakdown, VehicleBreakdown, VehicleCoverage,
        },
        vehicle::Vehicle,
    },
    services::{shift_service::local_date, vehicle_service},
};

/// Trailing-window coverage of one vehicle: `days` calendar days ending at
/// `end_date`, oldest first. Only completed entries count.
pub fn daily_coverage(
    vehicle: &Vehicle,
    entries: &[MileageEntry],
    end_date: NaiveDate,
    today: NaiveDate,
    days: u32,
) -> VehicleCoverage {
    let completed: Vec<&MileageEntry> = entries
        .iter()
        .filter(|entry| entry.vehicle_id == vehicle.id && entry.is_completed())
        .collect();

    let window: Vec<DayCoverage> = (0..days)
        .rev()
        .filter_map(|back| end_date.checked_sub_days(Days::new(u64::from(back))))
        .map(|date| {
            let (entry_count, miles) = completed
                .iter()
                .filter(|entry| entry.date == date)
                .fold((0, 0), |(count, miles), entry| {
                    (count + 1, miles + entry.total_miles.unwrap_or(0))
                });
            DayCoverage {
                date,
                miles,
                entry_count,
                has_entry: entry_count > 0,
                is_today: date == today,
            }
        })
        .collect();

    let missing_days = window
        .iter()
        .filter(|day| !day.has_entry)
        .map(|day| day.date)
        .collect();

    VehicleCoverage {
        vehicle_id: vehicle.id,
        vehicle_name: vehicle.name.clone(),
        license_plate: vehicle.license_plate.clone(),
        days_with_mileage: window.iter().filter(|day| day.has_entry).count(),
        window_miles: window.iter().map(|day| day.miles).sum(),
        all_time_miles: completed
            .iter()
            .map(|entry| entry.total_miles.unwrap_or(0))
            .sum(),
        missing_days,
        days: window,
    }
}

/// Aggregate the entries matching `query` into a summary.
///
/// Shift counts, miles, the mean and the first/second split are over
/// completed entries; `active_shifts` counts open entries in the same
/// filtered set. Every division is guarded, so an empty set yields zeros.
pub fn period_summary(
    entries: &[MileageEntry],
    vehicles: &[Vehicle],
    query: &SummaryQuery,
    today: NaiveDate,
) -> PeriodSummary {
    let start = query.period.start_date(today);
    let supervisor = query
        .supervisor_name
        .as_deref()
        .map(|name| name.trim().to_lowercase())
        .filter(|name| !name.is_empty());

    let matching: Vec<&MileageEntry> = entries
        .iter()
        .filter(|entry| start.is_none_or(|start| entry.date >= start && entry.date <= today))
        .filter(|entry| query.vehicle_id.is_none_or(|id| entry.vehicle_id == id))
        .filter(|entry| {
            supervisor
                .as_deref()
                .is_none_or(|name| entry.supervisor_name.to_lowercase() == name)
        })
        .collect();

    let completed: Vec<&MileageEntry> = matching
        .iter()
        .copied()
        .filter(|entry| entry.is_completed())
        .collect();

    let total_shifts = completed.len();
    let total_miles: i64 = completed
        .iter()
        .map(|entry| entry.total_miles.unwrap_or(0))
        .sum();
    let first = completed
        .iter()
        .filter(|entry| entry.shift == ShiftKind::First)
        .count();
    let second = total_shifts - first;

    let mut per_vehicle: HashMap<Uuid, (usize, i64)> = HashMap::new();
    // Supervisor names are snapshots; spellings differing only in case are one person.
    let mut per_supervisor: HashMap<String, (&str, usize, i64)> = HashMap::new();
    for entry in &completed {
        let miles = entry.total_miles.unwrap_or(0);
        let slot = per_vehicle.entry(entry.vehicle_id).or_default();
        slot.0 += 1;
        slot.1 += miles;
        let name = entry.supervisor_name.as_str();
        let slot = per_supervisor
            .entry(name.to_lowercase())
            .or_insert((name, 0, 0));
        slot.0 = slot.0.min(name);
        slot.1 += 1;
        slot.2 += miles;
    }

    let names: HashMap<Uuid, &str> = vehicles
        .iter()
        .map(|vehicle| (vehicle.id, vehicle.name.as_str()))
        .collect();

    let mut by_vehicle: Vec<VehicleBreakdown> = per_vehicle
        .into_iter()
        .map(|(vehicle_id, (shifts, miles))| VehicleBreakdown {
            vehicle_id,
            vehicle_name: names.get(&vehicle_id).map(|name| name.to_string()),
            shifts,
            miles,
        })
        .collect();
    by_vehicle.sort_by(|a, b| b.miles.cmp(&a.miles).then(a.vehicle_id.cmp(&b.vehicle_id)));

    let mut by_supervisor: Vec<SupervisorBreakdown> = per_supervisor
        .into_values()
        .map(|(name, shifts, miles)| SupervisorBreakdown {
            supervisor_name: name.to_string(),
            shifts,
            miles,
        })
        .collect();
    by_supervisor.sort_by(|a, b| {
        b.miles
            .cmp(&a.miles)
            .then_with(|| a.supervisor_name.cmp(&b.supervisor_name))
    });

    PeriodSummary {
        period: query.period,
        total_shifts,
        total_miles,
        average_miles_per_shift: ratio(total_miles as f64, total_shifts),
        active_shifts: matching.iter().filter(|entry| entry.is_active()).count(),
        shift_distribution: ShiftDistribution {
            first,
            second,
            first_percentage: ratio(first as f64 * 100.0, total_shifts),
            second_percentage: ratio(second as f64 * 100.0, total_shifts),
        },
        by_vehicle,
        by_supervisor,
    }
}

fn ratio(numerator: f64, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator / denominator as f64
    }
}

/// `GET /reports/daily-coverage`: one vehicle, or every vehicle when none is given.
pub async fn coverage_report(
    pool: &DbPool,
    config: &Config,
    query: &DailyCoverageQuery,
) -> Result<Vec<VehicleCoverage>, AppError> {
    let days = query.days.unwrap_or(config.coverage_window_days);
    if days == 0 || days > MAX_COVERAGE_WINDOW_DAYS {
        return Err(AppError::Validation(format!(
            "days must be between 1 and {MAX_COVERAGE_WINDOW_DAYS}"
        )));
    }

    let today = local_date(Utc::now(), config.site_offset());
    let end_date = query.end_date.unwrap_or(today);

    let vehicles = match query.vehicle_id {
        Some(vehicle_id) => vec![vehicle_service::get_vehicle(pool, vehicle_id).await?],
        None => vehicle_service::list_vehicles(pool).await?,
    };

    let entries = sqlx::query_as::<_, MileageEntry>(
        r#"
        SELECT * FROM mileage_entries
        WHERE status = 'completed'
        AND ($1::uuid IS NULL OR vehicle_id = $1)
        "#,
    )
    .bind(query.vehicle_id)
    .fetch_all(pool)
    .await?;

    Ok(vehicles
        .iter()
        .map(|vehicle| daily_coverage(vehicle, &entries, end_date, today, days))
        .collect())
}

/// `GET /reports/summary`
pub async fn summary_report(
    pool: &DbPool,
    config: &Config,
    query: &SummaryQuery,
) -> Result<PeriodSummary, AppError> {
    let today = local_date(Utc::now(), config.site_offset());

    let entries = sqlx::query_as::<_, MileageEntry>("SELECT * FROM mileage_entries")
        .fetch_all(pool)
        .await?;
    let vehicles = vehicle_service::list_vehicles(pool).await?;

    Ok(period_summary(&entries, &vehicles, query, today))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        mileage_entry::fixtures::{active_entry, completed_entry},
        report::Period,
    };

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    fn vehicle(name: &str) -> Vehicle {
        let now = Utc::now();
        Vehicle {
            id: Uuid::new_v4(),
            name: name.to_string(),
            license_plate: "ABC-123".to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn query(period: Period) -> SummaryQuery {
        SummaryQuery {
            period,
            vehicle_id: None,
            supervisor_name: None,
        }
    }

    #[test]
    fn test_coverage_marks_missing_days() {
        // Window 2025-03-01..=2025-03-07, entries on days 1, 3 and 5
        let v1 = vehicle("Patrol 1");
        let entries = vec![
            completed_entry(v1.id, "A", ShiftKind::First, date(1), 40),
            completed_entry(v1.id, "A", ShiftKind::Second, date(3), 25),
            completed_entry(v1.id, "B", ShiftKind::First, date(3), 5),
            completed_entry(v1.id, "B", ShiftKind::First, date(5), 30),
        ];

        let report = daily_coverage(&v1, &entries, date(7), date(7), 7);

        assert_eq!(report.days.len(), 7);
        assert_eq!(report.days[0].date, date(1));
        assert_eq!(report.days[6].date, date(7));
        assert!(report.days[6].is_today);
        assert_eq!(
            report.missing_days,
            vec![date(2), date(4), date(6), date(7)]
        );
        assert_eq!(report.days_with_mileage, 3);
        assert_eq!(report.days[2].miles, 30);
        assert_eq!(report.days[2].entry_count, 2);
        assert_eq!(report.window_miles, 100);
    }

    #[test]
    fn test_coverage_ignores_other_vehicles_and_active_entries() {
        let v1 = vehicle("Patrol 1");
        let v2 = vehicle("Patrol 2");
        let mut open = active_entry(500);
        open.vehicle_id = v1.id;
        open.date = date(7);

        let entries = vec![
            completed_entry(v2.id, "A", ShiftKind::First, date(7), 80),
            open,
            completed_entry(v1.id, "A", ShiftKind::First, date(1), 12),
        ];

        let report = daily_coverage(&v1, &entries, date(7), date(7), 3);

        assert_eq!(report.days.len(), 3);
        assert_eq!(report.days_with_mileage, 0);
        assert_eq!(report.window_miles, 0);
        assert_eq!(report.all_time_miles, 12);
    }

    #[test]
    fn test_summary_empty_set_is_all_zero() {
        let summary = period_summary(&[], &[], &query(Period::All), date(10));

        assert_eq!(summary.total_shifts, 0);
        assert_eq!(summary.total_miles, 0);
        assert_eq!(summary.average_miles_per_shift, 0.0);
        assert_eq!(summary.shift_distribution.first_percentage, 0.0);
        assert_eq!(summary.shift_distribution.second_percentage, 0.0);
        assert!(summary.by_vehicle.is_empty());
    }

    #[test]
    fn test_summary_totals_and_distribution() {
        let v1 = vehicle("Patrol 1");
        let v2 = vehicle("Patrol 2");
        let mut open = active_entry(1000);
        open.vehicle_id = v2.id;
        open.date = date(10);

        let entries = vec![
            completed_entry(v1.id, "Rivera", ShiftKind::First, date(10), 50),
            completed_entry(v1.id, "Okafor", ShiftKind::Second, date(9), 30),
            completed_entry(v2.id, "Rivera", ShiftKind::First, date(8), 20),
            completed_entry(v2.id, "Rivera", ShiftKind::First, date(7), 0),
            open,
        ];

        let summary = period_summary(&entries, &[v1.clone(), v2.clone()], &query(Period::All), date(10));

        assert_eq!(summary.total_shifts, 4);
        assert_eq!(summary.total_miles, 100);
        assert_eq!(summary.average_miles_per_shift, 25.0);
        assert_eq!(summary.active_shifts, 1);
        assert_eq!(summary.shift_distribution.first, 3);
        assert_eq!(summary.shift_distribution.second, 1);
        assert_eq!(summary.shift_distribution.first_percentage, 75.0);
        assert_eq!(summary.shift_distribution.second_percentage, 25.0);

        assert_eq!(summary.by_vehicle[0].vehicle_id, v1.id);
        assert_eq!(summary.by_vehicle[0].vehicle_name.as_deref(), Some("Patrol 1"));
        assert_eq!(summary.by_vehicle[0].miles, 80);
        assert_eq!(summary.by_vehicle[1].shifts, 2);

        assert_eq!(summary.by_supervisor[0].supervisor_name, "Rivera");
        assert_eq!(summary.by_supervisor[0].shifts, 3);
        assert_eq!(summary.by_supervisor[0].miles, 70);
    }

    #[test]
    fn test_summary_period_and_filters() {
        let v1 = vehicle("Patrol 1");
        let v2 = vehicle("Patrol 2");
        let entries = vec![
            completed_entry(v1.id, "Rivera", ShiftKind::First, date(10), 10),
            completed_entry(v1.id, "Rivera", ShiftKind::First, date(4), 20),
            completed_entry(v1.id, "Okafor", ShiftKind::First, date(3), 40),
            completed_entry(v2.id, "Rivera", ShiftKind::Second, date(10), 80),
        ];
        let vehicles = [v1.clone(), v2.clone()];

        let today = period_summary(&entries, &vehicles, &query(Period::Today), date(10));
        assert_eq!(today.total_miles, 90);

        // Trailing 7 days: 2025-03-04..=2025-03-10
        let week = period_summary(&entries, &vehicles, &query(Period::Week), date(10));
        assert_eq!(week.total_shifts, 3);

        let mut by_vehicle = query(Period::All);
        by_vehicle.vehicle_id = Some(v1.id);
        assert_eq!(period_summary(&entries, &vehicles, &by_vehicle, date(10)).total_miles, 70);

        let mut by_supervisor = query(Period::All);
        by_supervisor.supervisor_name = Some(" rivera ".to_string());
        let summary = period_summary(&entries, &vehicles, &by_supervisor, date(10));
        assert_eq!(summary.total_shifts, 3);
        assert_eq!(summary.total_miles, 110);
    }

    #[test]
    fn test_supervisor_breakdown_folds_case() {
        let v1 = vehicle("Patrol 1");
        let entries = vec![
            completed_entry(v1.id, "rivera", ShiftKind::First, date(10), 20),
            completed_entry(v1.id, "Rivera", ShiftKind::Second, date(9), 10),
        ];
        let vehicles = [v1];

        let mut filtered = query(Period::All);
        filtered.supervisor_name = Some("RIVERA".to_string());
        let summary = period_summary(&entries, &vehicles, &filtered, date(10));

        assert_eq!(summary.total_shifts, 2);
        assert_eq!(summary.by_supervisor.len(), 1);
        assert_eq!(summary.by_supervisor[0].supervisor_name, "Rivera");
        assert_eq!(summary.by_supervisor[0].shifts, 2);
        assert_eq!(summary.by_supervisor[0].miles, 30);
    }

    #[test]
    fn test_summary_keeps_dangling_vehicle_references() {
        let deleted = Uuid::new_v4();
        let entries = vec![completed_entry(deleted, "Rivera", ShiftKind::First, date(10), 50)];

        let summary = period_summary(&entries, &[], &query(Period::All), date(10));

        assert_eq!(summary.by_vehicle.len(), 1);
        assert_eq!(summary.by_vehicle[0].vehicle_id, deleted);
        assert_eq!(summary.by_vehicle[0].vehicle_name, None);
        assert_eq!(summary.total_miles, 50);
    }

    #[test]
    fn test_summary_is_order_independent() {
        let v1 = vehicle("Patrol 1");
        let mut entries = vec![
            completed_entry(v1.id, "Rivera", ShiftKind::First, date(10), 10),
            completed_entry(v1.id, "Okafor", ShiftKind::Second, date(9), 10),
            completed_entry(Uuid::new_v4(), "Lee", ShiftKind::First, date(8), 10),
        ];
        let vehicles = [v1];

        let forward = period_summary(&entries, &vehicles, &query(Period::All), date(10));
        entries.reverse();
        let backward = period_summary(&entries, &vehicles, &query(Period::All), date(10));

        assert_eq!(forward, backward);
    }
}
