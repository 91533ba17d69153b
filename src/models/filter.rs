// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Activity filter value and the client-side filtering/ordering rules.

use crate::error::{AppError, Result};
use crate::models::Activity;
use chrono::{DateTime, Utc};

/// Default page size for single-page listings.
pub const DEFAULT_PER_PAGE: u32 = 30;

/// Largest page the Strava list endpoint accepts.
pub const MAX_PER_PAGE: u32 = 200;

/// Constraints for an activity listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityFilter {
    /// Only activities that started before this instant
    pub before: Option<DateTime<Utc>>,
    /// Only activities that started after this instant
    pub after: Option<DateTime<Utc>>,
    /// Page number (1-indexed)
    pub page: u32,
    /// Activities per page
    pub per_page: u32,
    /// Exact sport type match (e.g. "Run")
    pub sport_type: Option<String>,
    /// With (`true`) or without (`false`) gear
    pub has_gear: Option<bool>,
    /// Exact gear ID match
    pub gear_id: Option<String>,
}

impl Default for ActivityFilter {
    fn default() -> Self {
        Self {
            before: None,
            after: None,
            page: 1,
            per_page: DEFAULT_PER_PAGE,
            sport_type: None,
            has_gear: None,
            gear_id: None,
        }
    }
}

impl ActivityFilter {
    /// Reject paging values the list endpoint would not accept.
    pub fn check_paging(&self) -> Result<()> {
        if self.page < 1 {
            return Err(AppError::BadRequest("page must be at least 1".to_string()));
        }
        if !(1..=MAX_PER_PAGE).contains(&self.per_page) {
            return Err(AppError::BadRequest(format!(
                "per_page must be between 1 and {}",
                MAX_PER_PAGE
            )));
        }
        Ok(())
    }

    /// Query parameters for the remote time window.
    pub fn time_window_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(before) = self.before {
            query.push(("before", before.timestamp().to_string()));
        }
        if let Some(after) = self.after {
            query.push(("after", after.timestamp().to_string()));
        }
        query
    }

    /// Apply the local predicates in order: sport type, gear presence,
    /// gear ID, then the `after` re-check (epoch seconds, exclusive).
    pub fn apply(&self, activities: Vec<Activity>) -> Vec<Activity> {
        let after_cutoff = self.after.map(|a| a.timestamp());

        activities
            .into_iter()
            .filter(|a| {
                self.sport_type
                    .as_deref()
                    .is_none_or(|sport| a.sport_type == sport)
            })
            .filter(|a| self.has_gear.is_none_or(|want| a.gear_id.is_some() == want))
            .filter(|a| {
                self.gear_id
                    .as_deref()
                    .is_none_or(|id| a.gear_id.as_deref() == Some(id))
            })
            .filter(|a| after_cutoff.is_none_or(|cutoff| a.start_date.timestamp() > cutoff))
            .collect()
    }
}

/// Sort newest first; ties broken by activity ID, highest first.
pub fn sort_newest_first(activities: &mut [Activity]) {
    activities.sort_by(|a, b| {
        b.start_date
            .cmp(&a.start_date)
            .then_with(|| b.id.cmp(&a.id))
    });
}
