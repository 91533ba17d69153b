//! Application configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honored for local development.

use crate::models::StravaTokens;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Strava API ---
    /// Strava OAuth client ID
    pub strava_client_id: String,
    /// Strava OAuth client secret
    pub strava_client_secret: String,
    /// Initial access token (overridden by the token file if present)
    pub strava_access_token: String,
    /// Initial refresh token (overridden by the token file if present)
    pub strava_refresh_token: String,
    /// Initial access token expiry (unix seconds)
    pub strava_token_expires_at: i64,
    /// Where refreshed credentials are persisted
    pub strava_token_file: PathBuf,
    /// Base URL of the REST API
    pub strava_api_base_url: String,
    /// OAuth token endpoint (code exchange and refresh)
    pub strava_oauth_token_url: String,
    /// Per-request network timeout
    pub http_timeout: Duration,

    // --- Track storage ---
    /// Directory for synthesized GPX files
    pub gpx_storage_path: PathBuf,
    /// Whether the daily GPX sweep runs
    pub gpx_cleanup_enabled: bool,
    /// Hour (UTC, 0-23) of the daily sweep
    pub gpx_cleanup_hour: u32,
    /// Minute (0-59) of the daily sweep
    pub gpx_cleanup_minute: u32,

    // --- Gear cache ---
    /// Gear cache entry lifetime; `None` keeps entries for the process lifetime
    pub gear_cache_ttl: Option<Duration>,

    // --- Server ---
    /// Bind address
    pub host: String,
    /// Server port
    pub port: u16,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            strava_client_id: "test_client_id".to_string(),
            strava_client_secret: "test_secret".to_string(),
            strava_access_token: String::new(),
            strava_refresh_token: String::new(),
            strava_token_expires_at: 0,
            strava_token_file: PathBuf::from("data/strava_tokens.json"),
            strava_api_base_url: "https://www.strava.com/api/v3".to_string(),
            strava_oauth_token_url: "https://www.strava.com/oauth/token".to_string(),
            http_timeout: Duration::from_secs(30),
            gpx_storage_path: PathBuf::from("./data/gpx"),
            gpx_cleanup_enabled: true,
            gpx_cleanup_hour: 3,
            gpx_cleanup_minute: 0,
            gear_cache_ttl: None,
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Config {
    /// Config used by tests.
    pub fn test_default() -> Self {
        Self::default()
    }

    /// Credentials as given in the environment.
    pub fn initial_tokens(&self) -> StravaTokens {
        StravaTokens {
            access_token: self.strava_access_token.clone(),
            refresh_token: self.strava_refresh_token.clone(),
            expires_at: self.strava_token_expires_at,
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let defaults = Self::default();

        let cleanup_hour = parse_var("GPX_CLEANUP_SCHEDULE_HOUR", defaults.gpx_cleanup_hour)?;
        if cleanup_hour > 23 {
            return Err(ConfigError::Invalid("GPX_CLEANUP_SCHEDULE_HOUR"));
        }
        let cleanup_minute =
            parse_var("GPX_CLEANUP_SCHEDULE_MINUTE", defaults.gpx_cleanup_minute)?;
        if cleanup_minute > 59 {
            return Err(ConfigError::Invalid("GPX_CLEANUP_SCHEDULE_MINUTE"));
        }

        let gear_cache_ttl = match env::var("GEAR_CACHE_TTL_SECS") {
            Ok(raw) if !raw.trim().is_empty() => Some(Duration::from_secs(
                raw.trim()
                    .parse()
                    .map_err(|_| ConfigError::Invalid("GEAR_CACHE_TTL_SECS"))?,
            )),
            _ => None,
        };

        Ok(Self {
            strava_client_id: env::var("STRAVA_CLIENT_ID")
                .map_err(|_| ConfigError::Missing("STRAVA_CLIENT_ID"))?,
            strava_client_secret: env::var("STRAVA_CLIENT_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("STRAVA_CLIENT_SECRET"))?,
            strava_access_token: env::var("STRAVA_ACCESS_TOKEN").unwrap_or_default(),
            strava_refresh_token: env::var("STRAVA_REFRESH_TOKEN").unwrap_or_default(),
            strava_token_expires_at: parse_var("STRAVA_TOKEN_EXPIRES_AT", 0)?,
            strava_token_file: env::var("STRAVA_TOKEN_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.strava_token_file),
            strava_api_base_url: env::var("STRAVA_API_BASE_URL")
                .unwrap_or(defaults.strava_api_base_url),
            strava_oauth_token_url: env::var("STRAVA_OAUTH_TOKEN_URL")
                .unwrap_or(defaults.strava_oauth_token_url),
            http_timeout: Duration::from_secs(parse_var("HTTP_TIMEOUT_SECS", 30)?),
            gpx_storage_path: env::var("GPX_STORAGE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.gpx_storage_path),
            gpx_cleanup_enabled: parse_var("GPX_CLEANUP_ENABLED", true)?,
            gpx_cleanup_hour: cleanup_hour,
            gpx_cleanup_minute: cleanup_minute,
            gear_cache_ttl,
            host: env::var("APP_HOST").unwrap_or(defaults.host),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .unwrap_or(8000),
        })
    }
}

/// Parse an optional env var, falling back to `default` when unset.
fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(name)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
