// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava NoShoes API Server
//!
//! Lists Strava activities with their gear, flags the ones logged without
//! gear, and exports GPX tracks.

use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use strava_noshoes::{
    config::Config,
    services::{
        storage::{cleanup_all_tracks, delay_until_next_run},
        CredentialStore, FileCredentialStore,
    },
    AppState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Strava NoShoes API");

    // Stored credentials win over the ones in the environment
    let store = Arc::new(FileCredentialStore::new(config.strava_token_file.clone()));
    let tokens = match store.load().await {
        Ok(Some(tokens)) => {
            tracing::info!(path = %config.strava_token_file.display(), "Loaded stored Strava tokens");
            tokens
        }
        Ok(None) => config.initial_tokens(),
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring unreadable token file");
            config.initial_tokens()
        }
    };

    let state = Arc::new(AppState::new(config.clone(), tokens, store)?);

    if config.gpx_cleanup_enabled {
        spawn_cleanup_timer(
            config.gpx_storage_path.clone(),
            config.gpx_cleanup_hour,
            config.gpx_cleanup_minute,
        );
    }

    // Build router
    let app = strava_noshoes::routes::create_router(state);

    // Start server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Sweep the track directory once a day at `hour:minute` UTC.
fn spawn_cleanup_timer(dir: PathBuf, hour: u32, minute: u32) {
    tracing::info!(hour, minute, "GPX cleanup scheduled daily (UTC)");

    tokio::spawn(async move {
        loop {
            let delay = delay_until_next_run(Utc::now(), hour, minute);
            tracing::debug!(seconds = delay.as_secs(), "Next GPX cleanup");
            tokio::time::sleep(delay).await;

            let report = cleanup_all_tracks(&dir).await;
            for error in &report.errors {
                tracing::warn!(error = %error, "GPX cleanup problem");
            }
        }
    });
}

/// Initialize structured JSON logging.
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("strava_noshoes=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
