// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Gear name resolution.
//!
//! Strava does not offer a gear listing endpoint, so names are looked up
//! one ID at a time and cached. Gear is cosmetic: a failed lookup leaves
//! the name unresolved instead of failing the caller.

use crate::error::Result;
use crate::models::filter::MAX_PER_PAGE;
use crate::models::{Activity, Gear};
use crate::services::StravaService;
use dashmap::DashMap;
use std::collections::BTreeSet;
use std::time::{Duration, Instant};

#[derive(Clone)]
struct CachedGear {
    name: String,
    cached_at: Instant,
}

/// Gear ID → display name cache backed by individual Strava lookups.
///
/// There is no lock around a miss: two concurrent callers may both look
/// up the same ID. Both write the same value.
pub struct GearResolver {
    strava: StravaService,
    cache: DashMap<String, CachedGear>,
    /// Entry lifetime; `None` keeps entries until invalidated.
    ttl: Option<Duration>,
}

impl GearResolver {
    pub fn new(strava: StravaService, ttl: Option<Duration>) -> Self {
        Self {
            strava,
            cache: DashMap::new(),
            ttl,
        }
    }

    /// Cached name, if present and not expired. Expired entries are dropped.
    fn cached_name(&self, gear_id: &str) -> Option<String> {
        let expired = {
            let entry = self.cache.get(gear_id)?;
            match self.ttl {
                Some(ttl) if entry.cached_at.elapsed() >= ttl => true,
                _ => return Some(entry.name.clone()),
            }
        };

        if expired {
            self.cache.remove(gear_id);
        }
        None
    }

    /// Look up one gear item, caching its name. Failures are logged and yield `None`.
    pub async fn fetch_gear(&self, gear_id: &str) -> Option<Gear> {
        match self.strava.get_gear(gear_id).await {
            Ok(gear) => {
                tracing::debug!(gear_id = %gear.id, name = %gear.name, "Cached gear");
                self.cache.insert(
                    gear.id.clone(),
                    CachedGear {
                        name: gear.name.clone(),
                        cached_at: Instant::now(),
                    },
                );
                Some(gear)
            }
            Err(e) => {
                tracing::warn!(gear_id, error = %e, "Gear lookup failed");
                None
            }
        }
    }

    /// Display name for a gear ID, looking it up on a cache miss.
    pub async fn name_for(&self, gear_id: &str) -> Option<String> {
        if let Some(name) = self.cached_name(gear_id) {
            return Some(name);
        }
        self.fetch_gear(gear_id).await.map(|g| g.name)
    }

    /// Look up every ID in `gear_ids` that is not already cached.
    pub async fn resolve_bulk(&self, gear_ids: &BTreeSet<String>) {
        let missing: Vec<&String> = gear_ids
            .iter()
            .filter(|id| self.cached_name(id).is_none())
            .collect();

        if missing.is_empty() {
            return;
        }

        tracing::debug!(count = missing.len(), "Fetching details for uncached gear");
        for gear_id in missing {
            self.fetch_gear(gear_id).await;
        }
    }

    /// Resolve and assign `gear_name` on each activity that has a gear ID.
    pub async fn apply_names(&self, activities: &mut [Activity]) {
        let gear_ids: BTreeSet<String> = activities
            .iter()
            .filter_map(|a| a.gear_id.clone())
            .collect();

        self.resolve_bulk(&gear_ids).await;

        for activity in activities.iter_mut() {
            activity.gear_name = activity
                .gear_id
                .as_deref()
                .and_then(|id| self.cached_name(id));
        }
    }

    /// List the athlete's gear, discovered from the most recent page of activities.
    pub async fn list_gear(&self) -> Result<Vec<Gear>> {
        let activities = self.strava.list_activities(&[], 1, MAX_PER_PAGE).await?;

        let gear_ids: BTreeSet<String> =
            activities.into_iter().filter_map(|a| a.gear_id).collect();
        tracing::info!(count = gear_ids.len(), "Found unique gear IDs from activities");

        let mut gear = Vec::with_capacity(gear_ids.len());
        for gear_id in &gear_ids {
            if let Some(item) = self.fetch_gear(gear_id).await {
                gear.push(item);
            }
        }
        Ok(gear)
    }

    /// Drop one cached entry.
    pub fn invalidate(&self, gear_id: &str) {
        self.cache.remove(gear_id);
    }

    /// Drop all cached entries.
    pub fn clear(&self) {
        self.cache.clear();
    }

    /// Number of cached entries (including any not yet found expired).
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }
}
