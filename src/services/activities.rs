// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity aggregation service.
//!
//! Handles the listing workflow:
//! 1. Fetch one page, or every page, of the athlete's activities
//! 2. Resolve gear names for the activities returned
//! 3. Apply the local filters
//! 4. Order newest first

use crate::error::Result;
use crate::models::filter::{sort_newest_first, MAX_PER_PAGE};
use crate::models::{Activity, ActivityFilter};
use crate::services::{GearResolver, StravaService};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Sport type used by the running-activity listing.
pub const RUN_SPORT_TYPE: &str = "Run";

/// Lists activities with gear names applied.
#[derive(Clone)]
pub struct ActivityAggregator {
    strava: StravaService,
    gear: Arc<GearResolver>,
}

impl ActivityAggregator {
    pub fn new(strava: StravaService, gear: Arc<GearResolver>) -> Self {
        Self { strava, gear }
    }

    /// List activities matching `filter`, newest first.
    ///
    /// With `fetch_all`, pages of 200 are fetched from page 1 until an empty
    /// or short page; `filter.page`/`per_page` are ignored. Otherwise exactly
    /// one page is fetched. Any remote failure discards pages already fetched.
    pub async fn list_activities(
        &self,
        filter: &ActivityFilter,
        fetch_all: bool,
    ) -> Result<Vec<Activity>> {
        if !fetch_all {
            filter.check_paging()?;
        }
        let window = filter.time_window_query();

        tracing::debug!(
            ?filter,
            fetch_all,
            "Listing activities"
        );

        let mut activities = if fetch_all {
            self.fetch_all_pages(&window).await?
        } else {
            self.strava
                .list_activities(&window, filter.page, filter.per_page)
                .await?
        };

        if !activities.is_empty() {
            self.gear.apply_names(&mut activities).await;
        }

        let mut activities = filter.apply(activities);
        sort_newest_first(&mut activities);
        Ok(activities)
    }

    async fn fetch_all_pages(&self, window: &[(&'static str, String)]) -> Result<Vec<Activity>> {
        let mut all = Vec::new();
        let mut page = 1;

        loop {
            let batch = self
                .strava
                .list_activities(window, page, MAX_PER_PAGE)
                .await?;
            let count = batch.len();
            tracing::debug!(page, count, "Fetched activity page");

            all.extend(batch);
            if count < MAX_PER_PAGE as usize {
                break;
            }
            page += 1;
        }

        Ok(all)
    }

    /// Get one activity with its gear name applied.
    pub async fn get_activity(&self, activity_id: u64) -> Result<Activity> {
        let activity = self.strava.get_activity(activity_id).await?;
        let mut activities = [activity];
        self.gear.apply_names(&mut activities).await;
        let [activity] = activities;
        Ok(activity)
    }

    /// All activities without gear, optionally only those after `after`.
    pub async fn activities_without_gear(
        &self,
        after: Option<DateTime<Utc>>,
    ) -> Result<Vec<Activity>> {
        let filter = ActivityFilter {
            has_gear: Some(false),
            after,
            ..Default::default()
        };
        self.list_activities(&filter, true).await
    }

    /// Running activities, at most `limit` of them.
    ///
    /// A limit up to one page is served by a single request; note that the
    /// sport filter runs after the fetch, so fewer than `limit` may come back.
    pub async fn running_activities(&self, limit: Option<u32>) -> Result<Vec<Activity>> {
        if limit == Some(0) {
            return Ok(Vec::new());
        }
        if let Some(limit) = limit.filter(|&l| l <= MAX_PER_PAGE) {
            let filter = ActivityFilter {
                sport_type: Some(RUN_SPORT_TYPE.to_string()),
                per_page: limit,
                ..Default::default()
            };
            return self.list_activities(&filter, false).await;
        }

        let filter = ActivityFilter {
            sport_type: Some(RUN_SPORT_TYPE.to_string()),
            ..Default::default()
        };
        let mut activities = self.list_activities(&filter, true).await?;

        if let Some(limit) = limit {
            activities.truncate(limit as usize);
        }
        Ok(activities)
    }
}
