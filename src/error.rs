// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Strava API error: {0}")]
    StravaApi(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Message used when the single refresh-and-retry attempt is exhausted.
    pub const STRAVA_AUTH_FAILED: &'static str = "Authentication failed. Please re-authenticate.";

    /// Message used when no usable access token exists at all.
    pub const STRAVA_NO_TOKEN: &'static str =
        "Access token not available. Please authenticate first.";

    /// Prefix of the error raised when an activity has no position stream.
    pub const NO_GPS_DATA: &'static str = "No GPS data (latlng stream) available for activity";

    /// Build the "no GPS data" error for an activity.
    pub fn no_gps_data(activity_id: u64) -> Self {
        AppError::StravaApi(format!("{} {}", Self::NO_GPS_DATA, activity_id))
    }

    /// True if this is an upstream authentication failure.
    pub fn is_strava_auth_error(&self) -> bool {
        match self {
            AppError::StravaApi(msg) => {
                msg == Self::STRAVA_AUTH_FAILED || msg == Self::STRAVA_NO_TOKEN
            }
            _ => false,
        }
    }

    /// True if a track could not be built because the position stream is missing.
    pub fn is_no_gps_data(&self) -> bool {
        matches!(self, AppError::StravaApi(msg) if msg.starts_with(Self::NO_GPS_DATA))
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::StravaApi(msg) => {
                (StatusCode::BAD_GATEWAY, "strava_error", Some(msg.clone()))
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
