// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! REST API routes under `/api/v1`.

use crate::error::{AppError, Result};
use crate::models::filter::{DEFAULT_PER_PAGE, MAX_PER_PAGE};
use crate::models::stats::summarize;
use crate::models::{Activity, ActivityFilter, ActivityStats, Athlete, Gear};
use crate::services::gpx::GPX_MEDIA_TYPE;
use crate::services::notify::{check_gearless, GearlessReport};
use crate::services::storage::read_track;
use crate::time_utils::parse_timestamp;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Days, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1", get(api_root))
        .route("/api/v1/athlete", get(get_athlete))
        .route("/api/v1/activities", get(get_activities))
        .route("/api/v1/activities/no-gear", get(get_activities_without_gear))
        .route("/api/v1/activities/running", get(get_running_activities))
        .route("/api/v1/activities/{id}", get(get_activity))
        .route("/api/v1/activities/{id}/download-gpx", post(download_gpx))
        .route("/api/v1/activities/{id}/gpx", get(get_gpx))
        .route("/api/v1/gear", get(get_gear))
        .route("/api/v1/stats/summary", get(get_stats_summary))
        .route("/api/v1/notifications/gearless", get(get_gearless_report))
}

fn validate_query<T: Validate>(query: &T) -> Result<()> {
    query
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))
}

fn parse_time_param(name: &str, raw: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    raw.filter(|s| !s.trim().is_empty())
        .map(|s| {
            parse_timestamp(s).ok_or_else(|| {
                AppError::BadRequest(format!(
                    "Invalid '{}' parameter: expected RFC3339 or YYYY-MM-DD[THH:MM:SS]",
                    name
                ))
            })
        })
        .transpose()
}

// ─── Root ────────────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "bindings/")
)]
pub struct ApiStatusResponse {
    pub status: String,
    pub message: String,
}

async fn api_root() -> Json<ApiStatusResponse> {
    Json(ApiStatusResponse {
        status: "ok".to_string(),
        message: "Strava NoShoes API is running".to_string(),
    })
}

async fn get_athlete(State(state): State<Arc<AppState>>) -> Result<Json<Athlete>> {
    Ok(Json(state.strava.get_athlete().await?))
}

// ─── Activities ──────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
struct ActivitiesQuery {
    before: Option<String>,
    after: Option<String>,
    #[serde(default = "default_page")]
    #[validate(range(min = 1))]
    page: u32,
    #[serde(default = "default_per_page")]
    #[validate(range(min = 1, max = 200))]
    per_page: u32,
    /// Sport type, e.g. `Run`
    activity_type: Option<String>,
    has_gear: Option<bool>,
    gear_id: Option<String>,
}

fn default_page() -> u32 {
    1
}
fn default_per_page() -> u32 {
    DEFAULT_PER_PAGE
}

/// One page of activities out of the full filtered list.
#[derive(Serialize)]
pub struct ActivitiesPage {
    pub items: Vec<Activity>,
    pub total: usize,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: usize,
}

/// Slice `all` into page `page` (1-based) of `per_page` items.
fn paginate(all: Vec<Activity>, page: u32, per_page: u32) -> ActivitiesPage {
    let total = all.len();
    let per_page_len = per_page.max(1) as usize;
    let total_pages = total.div_ceil(per_page_len);

    let start = (page.max(1) as usize - 1).saturating_mul(per_page_len);
    let items = all.into_iter().skip(start).take(per_page_len).collect();

    ActivitiesPage {
        items,
        total,
        page,
        per_page,
        total_pages,
    }
}

/// List activities with filters. Always walks every remote page so that
/// `total` reflects the filtered result.
async fn get_activities(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ActivitiesQuery>,
) -> Result<Json<ActivitiesPage>> {
    validate_query(&params)?;
    tracing::debug!(?params, "Fetching activities");

    let filter = ActivityFilter {
        before: parse_time_param("before", params.before.as_deref())?,
        after: parse_time_param("after", params.after.as_deref())?,
        page: params.page,
        per_page: params.per_page,
        sport_type: params.activity_type,
        has_gear: params.has_gear,
        gear_id: params.gear_id,
    };

    let all = state.activities.list_activities(&filter, true).await?;
    Ok(Json(paginate(all, params.page, params.per_page)))
}

async fn get_activity(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<Activity>> {
    Ok(Json(state.activities.get_activity(id).await?))
}

async fn get_activities_without_gear(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Activity>>> {
    Ok(Json(state.activities.activities_without_gear(None).await?))
}

#[derive(Debug, Deserialize, Validate)]
struct RunningQuery {
    #[validate(range(min = 1, max = 1000))]
    limit: Option<u32>,
}

async fn get_running_activities(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RunningQuery>,
) -> Result<Json<Vec<Activity>>> {
    validate_query(&params)?;
    Ok(Json(state.activities.running_activities(params.limit).await?))
}

async fn get_gear(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Gear>>> {
    Ok(Json(state.gear.list_gear().await?))
}

// ─── GPX ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct GpxQuery {
    /// Overrides the activity name for the file name and track name
    activity_name: Option<String>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "bindings/")
)]
pub struct DownloadGpxResponse {
    pub message: String,
    pub file_path: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub activity_id: u64,
}

async fn download_gpx(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Query(params): Query<GpxQuery>,
) -> Result<Json<DownloadGpxResponse>> {
    let path = state
        .tracks
        .synthesize(id, params.activity_name.as_deref())
        .await?;

    Ok(Json(DownloadGpxResponse {
        message: "GPX file downloaded successfully".to_string(),
        file_path: path.display().to_string(),
        activity_id: id,
    }))
}

/// `Content-Disposition` value; non-ASCII and quote characters are replaced.
fn attachment_header(file_name: &str) -> String {
    let safe: String = file_name
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("attachment; filename=\"{}\"", safe)
}

/// Serve the track file, synthesizing it first if needed.
async fn get_gpx(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Query(params): Query<GpxQuery>,
) -> Result<impl IntoResponse> {
    let path = state
        .tracks
        .synthesize(id, params.activity_name.as_deref())
        .await?;
    let bytes = read_track(&path).await?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("{}.gpx", id));

    Ok((
        [
            (header::CONTENT_TYPE, GPX_MEDIA_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, attachment_header(&file_name)),
        ],
        bytes,
    ))
}

// ─── Stats ───────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct StatsQuery {
    /// `1w`, `1m`, `3m`, `1y` or `all`; takes precedence over explicit bounds
    range: Option<String>,
    after: Option<String>,
    before: Option<String>,
}

/// Lower bound for a named range, `None` for `all`.
fn range_start(range: &str, now: DateTime<Utc>) -> Result<Option<DateTime<Utc>>> {
    let days = match range {
        "1w" => 7,
        "1m" => 30,
        "3m" => 90,
        "1y" => 365,
        "all" => return Ok(None),
        other => {
            return Err(AppError::BadRequest(format!(
                "Invalid 'range' parameter '{}': expected one of 1w, 1m, 3m, 1y, all",
                other
            )))
        }
    };
    Ok(now.checked_sub_days(Days::new(days)))
}

async fn get_stats_summary(
    State(state): State<Arc<AppState>>,
    Query(params): Query<StatsQuery>,
) -> Result<Json<ActivityStats>> {
    let (after, before) = match params.range.as_deref() {
        Some(range) => (range_start(range, Utc::now())?, None),
        None => (
            parse_time_param("after", params.after.as_deref())?,
            parse_time_param("before", params.before.as_deref())?,
        ),
    };

    let filter = ActivityFilter {
        after,
        before,
        per_page: MAX_PER_PAGE,
        ..Default::default()
    };
    let activities = state.activities.list_activities(&filter, true).await?;

    tracing::debug!(count = activities.len(), ?after, ?before, "Summarizing activities");
    Ok(Json(summarize(&activities)))
}

// ─── Notifications ───────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
struct GearlessQuery {
    #[validate(range(min = 1, max = 3650))]
    days_back: Option<u32>,
}

async fn get_gearless_report(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GearlessQuery>,
) -> Result<Json<GearlessReport>> {
    validate_query(&params)?;
    let report = check_gearless(&state.activities, params.days_back, Utc::now()).await?;
    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn activities(n: u64) -> Vec<Activity> {
        (1..=n)
            .map(|id| {
                serde_json::from_value(serde_json::json!({
                    "id": id,
                    "name": format!("Activity {}", id),
                    "distance": 1000.0,
                    "moving_time": 600,
                    "elapsed_time": 600,
                    "sport_type": "Run",
                    "start_date": "2024-05-01T06:30:00Z",
                }))
                .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_paginate_middle_and_last_page() {
        let page = paginate(activities(45), 2, 20);
        assert_eq!(page.total, 45);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items.len(), 20);
        assert_eq!(page.items[0].id, 21);

        let last = paginate(activities(45), 3, 20);
        assert_eq!(last.items.len(), 5);

        let beyond = paginate(activities(45), 9, 20);
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.total_pages, 3);
    }

    #[test]
    fn test_paginate_empty() {
        let page = paginate(Vec::new(), 1, 30);
        assert_eq!(page.total, 0);
        assert_eq!(page.total_pages, 0);
    }

    #[test]
    fn test_range_start() {
        let now = Utc.with_ymd_and_hms(2024, 5, 31, 12, 0, 0).unwrap();
        assert_eq!(
            range_start("1w", now).unwrap(),
            Some(Utc.with_ymd_and_hms(2024, 5, 24, 12, 0, 0).unwrap())
        );
        assert_eq!(
            range_start("1m", now).unwrap(),
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
        );
        assert_eq!(range_start("all", now).unwrap(), None);
        assert!(matches!(
            range_start("2w", now),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_attachment_header() {
        assert_eq!(
            attachment_header("Morning_Run.gpx"),
            "attachment; filename=\"Morning_Run.gpx\""
        );
        assert_eq!(
            attachment_header("Lauf_\"Fluß\".gpx"),
            "attachment; filename=\"Lauf__Flu__.gpx\""
        );
    }

    #[test]
    fn test_parse_time_param() {
        assert_eq!(parse_time_param("after", None).unwrap(), None);
        assert_eq!(parse_time_param("after", Some("")).unwrap(), None);
        assert_eq!(
            parse_time_param("after", Some("2024-05-01")).unwrap(),
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap())
        );
        assert!(matches!(
            parse_time_param("after", Some("yesterday")),
            Err(AppError::BadRequest(_))
        ));
    }
}
