// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Durable storage for Strava OAuth credentials.

use crate::error::{AppError, Result};
use crate::models::StravaTokens;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Mutex;

/// Persistence for `{access_token, refresh_token, expires_at}`.
///
/// Read once at startup; written after every successful refresh.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Load stored credentials, `None` if nothing has been stored yet.
    async fn load(&self) -> Result<Option<StravaTokens>>;

    /// Replace the stored credentials.
    async fn save(&self, tokens: &StravaTokens) -> Result<()>;
}

/// Credentials kept in a pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn load(&self) -> Result<Option<StravaTokens>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(AppError::Internal(anyhow::anyhow!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        let tokens = serde_json::from_str(&raw).map_err(|e| {
            AppError::Internal(anyhow::anyhow!(
                "Invalid token file {}: {}",
                self.path.display(),
                e
            ))
        })?;
        Ok(Some(tokens))
    }

    async fn save(&self, tokens: &StravaTokens) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Internal(e.into()))?;
        }

        let json = serde_json::to_string_pretty(tokens)
            .map_err(|e| AppError::Internal(e.into()))?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| AppError::Internal(e.into()))?;
        Ok(())
    }
}

/// In-memory credential store (tests and ephemeral runs).
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    tokens: Mutex<Option<StravaTokens>>,
}

impl MemoryCredentialStore {
    pub fn new(tokens: Option<StravaTokens>) -> Self {
        Self {
            tokens: Mutex::new(tokens),
        }
    }

    /// Last saved credentials.
    pub fn current(&self) -> Option<StravaTokens> {
        self.tokens.lock().ok().and_then(|t| t.clone())
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn load(&self) -> Result<Option<StravaTokens>> {
        Ok(self.current())
    }

    async fn save(&self, tokens: &StravaTokens) -> Result<()> {
        let mut guard = self
            .tokens
            .lock()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("credential store poisoned")))?;
        *guard = Some(tokens.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_store_round_trip_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("nested/strava_tokens.json"));

        assert!(store.load().await.unwrap().is_none());

        let tokens = StravaTokens {
            access_token: "access".into(),
            refresh_token: "refresh".into(),
            expires_at: 1_700_000_000,
        };
        store.save(&tokens).await.unwrap();

        assert_eq!(store.load().await.unwrap(), Some(tokens));
    }

    #[tokio::test]
    async fn test_file_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("strava_tokens.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = FileCredentialStore::new(path);
        assert!(matches!(store.load().await, Err(AppError::Internal(_))));
    }
}
