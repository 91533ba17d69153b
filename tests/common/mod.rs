// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use strava_noshoes::config::Config;
use strava_noshoes::models::StravaTokens;
use strava_noshoes::routes::create_router;
use strava_noshoes::services::{CredentialStore, MemoryCredentialStore};
use strava_noshoes::time_utils::format_utc_rfc3339;
use strava_noshoes::AppState;
use wiremock::MockServer;

/// 2100-01-01T00:00:00Z, far enough out that no proactive refresh happens.
#[allow(dead_code)]
pub const FAR_FUTURE: i64 = 4_102_444_800;

/// Path prefix the mock server serves the REST API under.
#[allow(dead_code)]
pub const API: &str = "/api/v3";

/// Config pointing every remote call at `server`.
#[allow(dead_code)]
pub fn test_config(server: &MockServer, storage: &Path) -> Config {
    Config {
        strava_api_base_url: format!("{}{}", server.uri(), API),
        strava_oauth_token_url: format!("{}/oauth/token", server.uri()),
        gpx_storage_path: storage.to_path_buf(),
        gpx_cleanup_enabled: false,
        http_timeout: Duration::from_secs(5),
        ..Config::test_default()
    }
}

#[allow(dead_code)]
pub fn tokens(access_token: &str, refresh_token: &str, expires_at: i64) -> StravaTokens {
    StravaTokens {
        access_token: access_token.to_string(),
        refresh_token: refresh_token.to_string(),
        expires_at,
    }
}

/// State with the given credentials and store.
#[allow(dead_code)]
pub fn create_test_state_with(
    server: &MockServer,
    storage: &Path,
    tokens: StravaTokens,
    store: Arc<dyn CredentialStore>,
) -> Arc<AppState> {
    let config = test_config(server, storage);
    Arc::new(AppState::new(config, tokens, store).expect("state should build"))
}

/// State with a valid, long-lived access token.
#[allow(dead_code)]
pub fn create_test_state(server: &MockServer, storage: &Path) -> Arc<AppState> {
    create_test_state_with(
        server,
        storage,
        tokens("test_access", "test_refresh", FAR_FUTURE),
        Arc::new(MemoryCredentialStore::default()),
    )
}

/// Router plus shared state backed by `server`.
#[allow(dead_code)]
pub fn create_test_app(server: &MockServer, storage: &Path) -> (axum::Router, Arc<AppState>) {
    let state = create_test_state(server, storage);
    (create_router(state.clone()), state)
}

/// Summary activity as returned by the list endpoint.
#[allow(dead_code)]
pub fn activity_json(
    id: u64,
    sport_type: &str,
    start: DateTime<Utc>,
    gear_id: Option<&str>,
) -> Value {
    json!({
        "id": id,
        "name": format!("Activity {}", id),
        "distance": 5000.0,
        "moving_time": 1800,
        "elapsed_time": 1900,
        "type": sport_type,
        "sport_type": sport_type,
        "start_date": format_utc_rfc3339(start),
        "gear_id": gear_id,
        "average_speed": 2.78,
    })
}

#[allow(dead_code)]
pub fn gear_json(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "primary": false,
        "retired": false,
        "distance": 123456.0,
    })
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    serde_json::from_slice(&bytes).expect("body should be JSON")
}
