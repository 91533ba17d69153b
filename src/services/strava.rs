// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava API client.
//!
//! Handles:
//! - Authenticated JSON requests against the REST API
//! - Proactive token refresh when the access token is about to expire
//! - One refresh-and-retry on 401, per [`AuthRetryPolicy`]
//! - Persisting refreshed credentials through a [`CredentialStore`]

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::streams::TRACK_STREAM_KEYS;
use crate::models::{Activity, Athlete, Gear, StravaTokens, StreamBundle};
use crate::services::credentials::CredentialStore;
use chrono::Utc;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Refresh proactively when the access token expires within this window (60 minutes).
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60 * 60;

/// Low-level Strava HTTP client. Knows nothing about token lifecycle.
#[derive(Clone)]
pub struct StravaClient {
    http: reqwest::Client,
    base_url: String,
    token_url: String,
    client_id: String,
    client_secret: String,
}

impl StravaClient {
    /// Create a client from configuration (API base URL, OAuth endpoint, credentials, timeout).
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("HTTP client init failed: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.strava_api_base_url.trim_end_matches('/').to_string(),
            token_url: config.strava_oauth_token_url.clone(),
            client_id: config.strava_client_id.clone(),
            client_secret: config.strava_client_secret.clone(),
        })
    }

    /// Send one authenticated request. Transport failures become `StravaApi`
    /// errors; the status code is left for the caller to inspect.
    pub async fn send(
        &self,
        method: Method,
        endpoint: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
        access_token: &str,
    ) -> Result<reqwest::Response> {
        let url = format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'));

        let mut request = self
            .http
            .request(method, &url)
            .bearer_auth(access_token)
            .query(query);
        if let Some(body) = body {
            request = request.json(body);
        }

        request
            .send()
            .await
            .map_err(|e| AppError::StravaApi(format!("Request error: {}", e)))
    }

    /// Refresh an expired access token.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenRefreshResponse> {
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| AppError::StravaApi(format!("Token refresh request failed: {}", e)))?;

        check_response_json(response).await
    }

    /// Exchange an OAuth authorization code for tokens.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenExchangeResponse> {
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| AppError::StravaApi(format!("Token exchange failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Strava token exchange failed");
            return Err(AppError::StravaApi(format!(
                "Token exchange failed with status {}",
                status
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::StravaApi(format!("Failed to parse token response: {}", e)))
    }
}

/// Check response and parse JSON body.
async fn check_response_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status == StatusCode::TOO_MANY_REQUESTS {
            tracing::warn!("Strava rate limit hit (429)");
        }

        if status == StatusCode::UNAUTHORIZED {
            return Err(AppError::StravaApi(AppError::STRAVA_AUTH_FAILED.to_string()));
        }

        return Err(AppError::StravaApi(format!("HTTP {}: {}", status, body)));
    }

    response
        .json()
        .await
        .map_err(|e| AppError::StravaApi(format!("JSON parse error: {}", e)))
}

/// Token refresh response from Strava.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
}

/// Token exchange response from Strava OAuth (includes athlete info).
#[derive(Debug, Clone, Deserialize)]
pub struct TokenExchangeResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
    pub athlete: Athlete,
}

// ─────────────────────────────────────────────────────────────────────────────
// AuthRetryPolicy - bounded refresh-and-retry on 401
// ─────────────────────────────────────────────────────────────────────────────

/// How many times a request may be sent when Strava rejects the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthRetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
}

impl Default for AuthRetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 2 }
    }
}

impl AuthRetryPolicy {
    /// Whether attempt number `attempt` (1-based) that returned `status`
    /// should trigger a credential refresh and another attempt.
    pub fn should_refresh(&self, status: StatusCode, attempt: u32) -> bool {
        status == StatusCode::UNAUTHORIZED && attempt < self.max_attempts
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// StravaService - High-level service with token management
// ─────────────────────────────────────────────────────────────────────────────

/// High-level Strava service that manages the credential lifecycle and API calls.
///
/// Cheap to clone; clones share credentials and the refresh lock.
#[derive(Clone)]
pub struct StravaService {
    client: StravaClient,
    tokens: Arc<RwLock<StravaTokens>>,
    /// Serializes refreshes so a burst of 401s spends the refresh token once.
    refresh_lock: Arc<Mutex<()>>,
    store: Arc<dyn CredentialStore>,
    retry_policy: AuthRetryPolicy,
}

impl StravaService {
    pub fn new(client: StravaClient, tokens: StravaTokens, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            client,
            tokens: Arc::new(RwLock::new(tokens)),
            refresh_lock: Arc::new(Mutex::new(())),
            store,
            retry_policy: AuthRetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry_policy: AuthRetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// Snapshot of the current credentials.
    pub async fn current_tokens(&self) -> StravaTokens {
        self.tokens.read().await.clone()
    }

    // ─── Token Management ────────────────────────────────────────────────────

    /// Get an access token, refreshing first if it expires soon.
    async fn access_token(&self) -> Result<String> {
        let now = Utc::now().timestamp();
        let tokens = self.current_tokens().await;

        if tokens.expires_within(now, TOKEN_REFRESH_MARGIN_SECS) && !tokens.refresh_token.is_empty()
        {
            tracing::info!(
                expires_at = tokens.expires_at,
                "Strava token expiring soon or missing, refreshing"
            );
            match self.refresh(&tokens.access_token).await {
                Ok(access_token) => return Ok(access_token),
                Err(e) => tracing::warn!(error = %e, "Proactive token refresh failed"),
            }
        }

        let tokens = self.tokens.read().await;
        if tokens.access_token.is_empty() {
            return Err(AppError::StravaApi(AppError::STRAVA_NO_TOKEN.to_string()));
        }
        Ok(tokens.access_token.clone())
    }

    /// Refresh credentials and persist them.
    ///
    /// `stale` is the access token the caller was using. If another task
    /// already replaced it while we waited for the lock, its result is reused.
    async fn refresh(&self, stale: &str) -> Result<String> {
        let _guard = self.refresh_lock.lock().await;

        let refresh_token = {
            let tokens = self.tokens.read().await;
            if !tokens.access_token.is_empty() && tokens.access_token != stale {
                return Ok(tokens.access_token.clone());
            }
            tokens.refresh_token.clone()
        };

        if refresh_token.is_empty() {
            return Err(AppError::StravaApi(AppError::STRAVA_AUTH_FAILED.to_string()));
        }

        let response = self.client.refresh_token(&refresh_token).await?;
        let new_tokens = StravaTokens {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            expires_at: response.expires_at,
        };

        *self.tokens.write().await = new_tokens.clone();

        // A failed write only costs us a refresh after restart.
        if let Err(e) = self.store.save(&new_tokens).await {
            tracing::warn!(error = %e, "Failed to persist refreshed Strava tokens");
        }

        tracing::info!(expires_at = new_tokens.expires_at, "Strava token refreshed");
        Ok(new_tokens.access_token)
    }

    // ─── Requests ────────────────────────────────────────────────────────────

    /// Make an authenticated request and return the JSON body.
    ///
    /// A 401 triggers a credential refresh and another attempt while the
    /// retry policy allows it. If the refresh fails the request fails with
    /// [`AppError::STRAVA_AUTH_FAILED`].
    pub async fn request(
        &self,
        method: Method,
        endpoint: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value> {
        let mut attempt = 1;
        loop {
            let access_token = self.access_token().await?;
            let response = self
                .client
                .send(method.clone(), endpoint, query, body, &access_token)
                .await?;

            if self.retry_policy.should_refresh(response.status(), attempt) {
                tracing::info!(endpoint, attempt, "Strava returned 401, refreshing token");
                if let Err(e) = self.refresh(&access_token).await {
                    tracing::warn!(error = %e, "Token refresh after 401 failed");
                    return Err(AppError::StravaApi(AppError::STRAVA_AUTH_FAILED.to_string()));
                }
                attempt += 1;
                continue;
            }

            return check_response_json(response).await;
        }
    }

    /// GET an endpoint and deserialize the body.
    async fn get_as<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let value = self.request(Method::GET, endpoint, query, None).await?;
        serde_json::from_value(value)
            .map_err(|e| AppError::StravaApi(format!("JSON parse error: {}", e)))
    }

    // ─── API Wrappers ────────────────────────────────────────────────────────

    /// Get authenticated athlete profile.
    pub async fn get_athlete(&self) -> Result<Athlete> {
        self.get_as("/athlete", &[]).await
    }

    /// Fetch one page of the athlete's activity list.
    pub async fn list_activities(
        &self,
        window: &[(&'static str, String)],
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Activity>> {
        let mut query: Vec<(&str, String)> = window.to_vec();
        query.push(("page", page.to_string()));
        query.push(("per_page", per_page.to_string()));
        self.get_as("/athlete/activities", &query).await
    }

    /// Get a detailed activity by ID.
    pub async fn get_activity(&self, activity_id: u64) -> Result<Activity> {
        self.get_as(&format!("/activities/{}", activity_id), &[])
            .await
    }

    /// Get a gear item by ID.
    pub async fn get_gear(&self, gear_id: &str) -> Result<Gear> {
        self.get_as(&format!("/gear/{}", urlencoding::encode(gear_id)), &[])
            .await
    }

    /// Fetch the streams needed for a GPS track in one request.
    pub async fn get_activity_streams(&self, activity_id: u64) -> Result<StreamBundle> {
        let query = [
            ("keys", TRACK_STREAM_KEYS.join(",")),
            ("key_by_type", "true".to_string()),
        ];
        self.get_as(&format!("/activities/{}/streams", activity_id), &query)
            .await
    }

    // ─── OAuth Callback Handling ─────────────────────────────────────────────

    /// Handle OAuth callback: exchange the code for tokens and store them.
    pub async fn handle_oauth_callback(&self, code: &str) -> Result<Athlete> {
        let response = self.client.exchange_code(code).await?;

        let tokens = StravaTokens {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            expires_at: response.expires_at,
        };

        {
            let _guard = self.refresh_lock.lock().await;
            *self.tokens.write().await = tokens.clone();
        }
        self.store.save(&tokens).await?;

        tracing::info!(
            athlete_id = response.athlete.id,
            "OAuth callback handled, tokens stored"
        );
        Ok(response.athlete)
    }
}
