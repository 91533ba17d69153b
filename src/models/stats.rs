//! Summary statistics over an already-fetched list of activities.
//!
//! Pure computation; the caller decides which activities go in.

use serde::Serialize;
use std::collections::BTreeMap;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::Activity;

/// Totals across all activities.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "bindings/")
)]
pub struct StatsTotal {
    pub count: u32,
    pub distance_meters: f64,
    pub distance_km: f64,
    /// Moving time
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub time_seconds: u64,
    pub time_hours: f64,
    pub activities_without_gear: u32,
}

/// Totals for one sport type.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "bindings/")
)]
pub struct SportTypeStats {
    pub count: u32,
    pub distance_meters: f64,
    pub distance_km: f64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub time_seconds: u64,
    pub time_hours: f64,
}

/// Summary returned by the stats endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "bindings/")
)]
pub struct ActivityStats {
    pub total: StatsTotal,
    /// Activity count per sport type
    pub activity_types_count: BTreeMap<String, u32>,
    /// Detailed totals per sport type
    pub activity_types_detailed: BTreeMap<String, SportTypeStats>,
}

/// Summarize activities. Empty input yields all-zero totals.
pub fn summarize(activities: &[Activity]) -> ActivityStats {
    let mut stats = ActivityStats::default();

    for activity in activities {
        stats.total.count += 1;
        stats.total.distance_meters += activity.distance;
        stats.total.time_seconds += activity.moving_time;
        if activity.gear_id.is_none() {
            stats.total.activities_without_gear += 1;
        }

        *stats
            .activity_types_count
            .entry(activity.sport_type.clone())
            .or_insert(0) += 1;

        let details = stats
            .activity_types_detailed
            .entry(activity.sport_type.clone())
            .or_default();
        details.count += 1;
        details.distance_meters += activity.distance;
        details.time_seconds += activity.moving_time;
    }

    stats.total.distance_km = meters_to_km(stats.total.distance_meters);
    stats.total.time_hours = seconds_to_hours(stats.total.time_seconds);

    for details in stats.activity_types_detailed.values_mut() {
        details.distance_km = meters_to_km(details.distance_meters);
        details.time_hours = seconds_to_hours(details.time_seconds);
    }

    stats
}

fn meters_to_km(meters: f64) -> f64 {
    round2(meters / 1000.0)
}

fn seconds_to_hours(seconds: u64) -> f64 {
    round2(seconds as f64 / 3600.0)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
