// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Text produced for the chat notification layer.
//!
//! Messages use Telegram-style HTML (`<b>`, `<a href>`), so activity names
//! are escaped before they are embedded.

use crate::error::Result;
use crate::markup::escape;
use crate::models::Activity;
use crate::services::ActivityAggregator;
use chrono::{DateTime, Days, Utc};
use serde::Serialize;

const ACTIVITY_URL_PREFIX: &str = "https://www.strava.com/activities/";

/// Activities listed individually in a gearless report.
pub const GEARLESS_REPORT_LIMIT: usize = 10;

/// Outcome of a gearless-activity check.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(ts_rs::TS))]
#[cfg_attr(feature = "binding-generation", ts(export, export_to = "bindings/"))]
pub struct GearlessReport {
    pub count: usize,
    /// `None` when nothing was found
    pub message: Option<String>,
}

/// Find activities without gear, optionally within the last `days_back` days.
pub async fn check_gearless(
    activities: &ActivityAggregator,
    days_back: Option<u32>,
    now: DateTime<Utc>,
) -> Result<GearlessReport> {
    let after = days_back.and_then(|days| now.checked_sub_days(Days::new(u64::from(days))));
    let found = activities.activities_without_gear(after).await?;

    tracing::info!(count = found.len(), ?days_back, "Checked for activities without gear");

    Ok(GearlessReport {
        count: found.len(),
        message: gearless_message(&found, days_back),
    })
}

/// Report text for gearless activities, `None` if there are none.
pub fn gearless_message(activities: &[Activity], days_back: Option<u32>) -> Option<String> {
    if activities.is_empty() {
        return None;
    }

    let window = days_back
        .map(|days| format!(" (last {} days)", days))
        .unwrap_or_default();
    let mut message = format!(
        "⚠️ Found {} activities without gear{}:\n\n",
        activities.len(),
        window
    );

    for activity in activities.iter().take(GEARLESS_REPORT_LIMIT) {
        message.push_str(&format!(
            "• <a href='{}{}'>{}</a> ({})\n",
            ACTIVITY_URL_PREFIX,
            activity.id,
            escape(&activity.name),
            activity.start_date.format("%Y-%m-%d")
        ));
    }

    if activities.len() > GEARLESS_REPORT_LIMIT {
        message.push_str(&format!(
            "\n...and {} more.",
            activities.len() - GEARLESS_REPORT_LIMIT
        ));
    }

    Some(message)
}

/// First activity ID linked in `text`.
pub fn parse_activity_link(text: &str) -> Option<u64> {
    text.match_indices(ACTIVITY_URL_PREFIX).find_map(|(start, prefix)| {
        let rest = &text[start + prefix.len()..];
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        rest[..end].parse().ok()
    })
}

/// Short HTML summary of one activity.
pub fn format_activity_summary(activity: &Activity) -> String {
    let distance_km = activity.distance / 1000.0;
    let minutes = activity.moving_time / 60;

    let pace = if activity.average_speed > 0.0 {
        let secs_per_km = (1000.0 / activity.average_speed) as u64;
        format!("\n📈 Pace: {}:{:02} min/km", secs_per_km / 60, secs_per_km % 60)
    } else {
        String::new()
    };

    let mut message = format!(
        "🏃 <b>{}</b>\n📅 {}\n🏷 Type: {}\n📏 Distance: {:.2} km\n⏱ Time: {} min{}\n",
        escape(&activity.name),
        activity.start_date.format("%Y-%m-%d %H:%M"),
        activity.sport_type,
        distance_km,
        minutes,
        pace
    );

    if let Some(gear_id) = &activity.gear_id {
        let gear = activity.gear_name.as_deref().unwrap_or(gear_id);
        message.push_str(&format!("\n👟 Gear: {}", escape(gear)));
    }

    message
}
