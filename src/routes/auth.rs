// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava OAuth callback route.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::Athlete;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/auth/strava/callback", get(auth_callback))
}

/// Query parameters from Strava's OAuth redirect.
#[derive(Deserialize)]
pub struct AuthCallbackParams {
    code: Option<String>,
    /// Set when the athlete denied access
    error: Option<String>,
    #[allow(dead_code)]
    scope: Option<String>,
}

#[derive(Serialize)]
pub struct AuthCallbackResponse {
    pub message: String,
    pub athlete: Athlete,
}

/// Exchange the authorization code and store the resulting credentials.
async fn auth_callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AuthCallbackParams>,
) -> Result<Json<AuthCallbackResponse>> {
    if let Some(error) = params.error {
        tracing::warn!(error = %error, "OAuth denied by user");
        return Err(AppError::BadRequest(format!("Authorization denied: {}", error)));
    }

    let code = params
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing authorization code".to_string()))?;

    let athlete = state.strava.handle_oauth_callback(&code).await?;

    Ok(Json(AuthCallbackResponse {
        message: "Authentication successful".to_string(),
        athlete,
    }))
}
