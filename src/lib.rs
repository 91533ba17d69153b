// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Strava NoShoes: find activities logged without gear
//!
//! This crate provides the backend API for listing Strava activities with
//! their gear names, summarizing them, and exporting GPX tracks.

pub mod config;
pub mod error;
pub mod markup;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use error::Result;
use models::StravaTokens;
use services::{
    ActivityAggregator, CredentialStore, GearResolver, StravaClient, StravaService,
    TrackSynthesizer,
};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub strava: StravaService,
    pub gear: Arc<GearResolver>,
    pub activities: ActivityAggregator,
    pub tracks: TrackSynthesizer,
}

impl AppState {
    /// Wire up the services for `config`, starting from `tokens`.
    pub fn new(
        config: Config,
        tokens: StravaTokens,
        store: Arc<dyn CredentialStore>,
    ) -> Result<Self> {
        let client = StravaClient::new(&config)?;
        let strava = StravaService::new(client, tokens, store);
        let gear = Arc::new(GearResolver::new(strava.clone(), config.gear_cache_ttl));
        let activities = ActivityAggregator::new(strava.clone(), gear.clone());
        let tracks = TrackSynthesizer::new(strava.clone(), config.gpx_storage_path.clone());

        Ok(Self {
            config,
            strava,
            gear,
            activities,
            tracks,
        })
    }
}
