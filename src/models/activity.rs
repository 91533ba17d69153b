// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Strava activity model as returned by the list and detail endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A Strava activity.
///
/// Only `gear_name` is filled in locally (by the gear resolver); every
/// other field is exactly what Strava returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    /// Strava activity ID
    pub id: u64,
    /// Activity name/title
    pub name: String,
    /// Distance in meters
    pub distance: f64,
    /// Moving time in seconds
    pub moving_time: u64,
    /// Elapsed time in seconds
    pub elapsed_time: u64,
    #[serde(default)]
    pub total_elevation_gain: f64,
    /// Legacy activity type
    #[serde(rename = "type", default)]
    pub activity_type: String,
    /// Sport type (Ride, Run, Hike, etc.)
    pub sport_type: String,
    /// Start time (UTC)
    pub start_date: DateTime<Utc>,
    /// Start time in the athlete's local zone (Strava marks it `Z` anyway)
    #[serde(default)]
    pub start_date_local: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub utc_offset: Option<f64>,
    /// Gear used, if any
    #[serde(default)]
    pub gear_id: Option<String>,
    /// Display name of the gear, resolved locally
    #[serde(default)]
    pub gear_name: Option<String>,
    /// Average speed (m/s)
    #[serde(default)]
    pub average_speed: f64,
    /// Max speed (m/s)
    #[serde(default)]
    pub max_speed: f64,
    #[serde(default)]
    pub average_cadence: Option<f64>,
    #[serde(default)]
    pub has_heartrate: bool,
    #[serde(default)]
    pub average_heartrate: Option<f64>,
    #[serde(default)]
    pub max_heartrate: Option<f64>,
    #[serde(default)]
    pub start_latlng: Option<Vec<f64>>,
    #[serde(default)]
    pub end_latlng: Option<Vec<f64>>,
    #[serde(default)]
    pub map: Option<ActivityMap>,
    #[serde(default)]
    pub trainer: bool,
    #[serde(default)]
    pub commute: bool,
    #[serde(default)]
    pub manual: bool,
    #[serde(default)]
    pub private: bool,
}

/// Activity map data with polylines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityMap {
    pub id: String,
    #[serde(default)]
    pub summary_polyline: Option<String>,
    #[serde(default)]
    pub polyline: Option<String>,
}
