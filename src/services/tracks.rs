// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! GPX track synthesis.
//!
//! Handles the download workflow:
//! 1. Fetch the activity for its name and start time
//! 2. Return the cached file if one already exists for that name
//! 3. Otherwise fetch the streams and build the track
//! 4. Write the file atomically (temp file, then rename)

use crate::error::{AppError, Result};
use crate::services::gpx::TrackDocument;
use crate::services::StravaService;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Cache file name for a display name: spaces and path separators become `_`.
///
/// Distinct names can map to the same file (`"a b"` and `"a_b"`); the
/// second one to be synthesized is served the first one's track.
pub fn track_file_name(display_name: &str) -> String {
    let sanitized: String = display_name
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            c => c,
        })
        .collect();
    format!("{}.gpx", sanitized)
}

/// Builds GPX files for activities and caches them on disk.
#[derive(Clone)]
pub struct TrackSynthesizer {
    strava: StravaService,
    storage_dir: PathBuf,
}

impl TrackSynthesizer {
    pub fn new(strava: StravaService, storage_dir: impl Into<PathBuf>) -> Self {
        Self {
            strava,
            storage_dir: storage_dir.into(),
        }
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    /// Path a track for `display_name` is stored under.
    pub fn track_path(&self, display_name: &str) -> PathBuf {
        self.storage_dir.join(track_file_name(display_name))
    }

    /// Produce the GPX file for an activity and return its path.
    ///
    /// `display_name` overrides the activity's own name for both the cache
    /// key and the track name. An existing file is returned without
    /// fetching streams. Fails with a no-GPS-data error if the activity
    /// has no position stream; nothing is written in that case.
    pub async fn synthesize(&self, activity_id: u64, display_name: Option<&str>) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.storage_dir)
            .await
            .map_err(|e| {
                AppError::Internal(anyhow::anyhow!(
                    "Failed to create {}: {}",
                    self.storage_dir.display(),
                    e
                ))
            })?;

        let activity = self.strava.get_activity(activity_id).await?;
        let name = display_name.unwrap_or(&activity.name).to_string();
        let path = self.track_path(&name);

        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tracing::info!(activity_id, path = %path.display(), "GPX file already exists");
            return Ok(path);
        }

        let streams = self.strava.get_activity_streams(activity_id).await?;
        let document = TrackDocument::from_streams(activity_id, &name, activity.start_date, &streams)?;

        write_atomic(&path, document.to_xml().as_bytes()).await?;

        tracing::info!(
            activity_id,
            points = document.points.len(),
            path = %path.display(),
            "GPX file created"
        );
        Ok(path)
    }
}

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Sibling temp path unique to this write, so concurrent writers of the
/// same track never share one.
fn temp_path_for(path: &Path) -> PathBuf {
    let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let file_name = path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.{}.{}.tmp", file_name, std::process::id(), n))
}

/// Write `contents` to a sibling temp file and rename it over `path`.
async fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let tmp = temp_path_for(path);

    if let Err(e) = tokio::fs::write(&tmp, contents).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(AppError::Internal(anyhow::anyhow!(
            "Failed to write {}: {}",
            tmp.display(),
            e
        )));
    }

    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(AppError::Internal(anyhow::anyhow!(
            "Failed to move track into place at {}: {}",
            path.display(),
            e
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_file_name_replaces_separators() {
        assert_eq!(track_file_name("Morning Run"), "Morning_Run.gpx");
        assert_eq!(track_file_name("up/down\\hill"), "up_down_hill.gpx");
        assert_eq!(track_file_name("Lauf am Fluß"), "Lauf_am_Fluß.gpx");
    }

    #[test]
    fn test_track_file_name_collision() {
        assert_eq!(track_file_name("a b"), track_file_name("a_b"));
    }

    #[test]
    fn test_temp_paths_are_unique_siblings() {
        let path = Path::new("/data/gpx/Run.gpx");
        let a = temp_path_for(path);
        let b = temp_path_for(path);

        assert_ne!(a, b);
        assert_eq!(a.parent(), path.parent());
        assert!(a.file_name().unwrap().to_string_lossy().starts_with(".Run.gpx."));
        assert_eq!(a.extension().unwrap(), "tmp");
    }

    #[tokio::test]
    async fn test_write_atomic_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Run.gpx");

        write_atomic(&path, b"<gpx/>").await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"<gpx/>");
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names.len(), 1);
    }
}
