// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Track storage housekeeping: sweeping, sizing, reading, scheduling.

use crate::error::{AppError, Result};
use chrono::{DateTime, Days, Utc};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

const TRACK_EXTENSION: &str = "gpx";

/// Result of a storage sweep.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(ts_rs::TS))]
#[cfg_attr(feature = "binding-generation", ts(export, export_to = "bindings/"))]
pub struct CleanupReport {
    pub files_deleted: u64,
    pub space_freed: u64,
    pub space_freed_human: String,
    pub errors: Vec<String>,
}

/// Current track storage usage.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(ts_rs::TS))]
#[cfg_attr(feature = "binding-generation", ts(export, export_to = "bindings/"))]
pub struct StorageStats {
    pub total_files: u64,
    pub total_size_bytes: u64,
    pub total_size_mb: f64,
}

/// Human-readable size with two decimals, e.g. `"1.50 KB"`.
pub fn format_file_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    for unit in ["B", "KB", "MB", "GB"] {
        if size < 1024.0 {
            return format!("{:.2} {}", size, unit);
        }
        size /= 1024.0;
    }
    format!("{:.2} TB", size)
}

fn is_track_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == TRACK_EXTENSION)
}

/// Paths and sizes of every track file directly inside `dir`.
async fn track_files(dir: &Path) -> std::io::Result<Vec<(std::path::PathBuf, u64)>> {
    let mut files = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !is_track_file(&path) {
            continue;
        }
        let metadata = entry.metadata().await?;
        if metadata.is_file() {
            files.push((path, metadata.len()));
        }
    }
    Ok(files)
}

/// Delete every track file in `dir`.
///
/// Problems (missing directory, undeletable files) are collected in
/// `errors`; the sweep continues past individual failures.
pub async fn cleanup_all_tracks(dir: &Path) -> CleanupReport {
    let mut report = CleanupReport {
        space_freed_human: "0 B".to_string(),
        ..Default::default()
    };

    match tokio::fs::metadata(dir).await {
        Ok(metadata) if metadata.is_dir() => {}
        Ok(_) => {
            tracing::error!(path = %dir.display(), "Track storage path is not a directory");
            report
                .errors
                .push(format!("Storage path is not a directory: {}", dir.display()));
            return report;
        }
        Err(_) => {
            tracing::warn!(path = %dir.display(), "Track storage path does not exist");
            report
                .errors
                .push(format!("Storage path does not exist: {}", dir.display()));
            return report;
        }
    }

    let files = match track_files(dir).await {
        Ok(files) => files,
        Err(e) => {
            let msg = format!("Error during track cleanup: {}", e);
            tracing::error!(error = %e, "Track cleanup failed");
            report.errors.push(msg);
            return report;
        }
    };
    tracing::info!(count = files.len(), "Found track files to delete");

    for (path, size) in files {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                report.files_deleted += 1;
                report.space_freed += size;
                tracing::debug!(file = %file_name, size = %format_file_size(size), "Deleted track");
            }
            Err(e) => {
                tracing::error!(file = %file_name, error = %e, "Failed to delete track");
                report
                    .errors
                    .push(format!("Error deleting {}: {}", file_name, e));
            }
        }
    }

    report.space_freed_human = format_file_size(report.space_freed);
    tracing::info!(
        files_deleted = report.files_deleted,
        space_freed = %report.space_freed_human,
        "Track cleanup completed"
    );
    report
}

/// Count and size the track files in `dir`. A missing directory is empty.
pub async fn storage_stats(dir: &Path) -> Result<StorageStats> {
    let files = match track_files(dir).await {
        Ok(files) => files,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(e) => return Err(AppError::Internal(e.into())),
    };

    let total_size_bytes: u64 = files.iter().map(|(_, size)| size).sum();
    let total_size_mb = (total_size_bytes as f64 / (1024.0 * 1024.0) * 100.0).round() / 100.0;

    Ok(StorageStats {
        total_files: files.len() as u64,
        total_size_bytes,
        total_size_mb,
    })
}

/// Read a stored track.
pub async fn read_track(path: &Path) -> Result<Vec<u8>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AppError::NotFound(format!(
            "GPX file not found: {}",
            path.display()
        ))),
        Err(e) => Err(AppError::Internal(anyhow::anyhow!(
            "Failed to read {}: {}",
            path.display(),
            e
        ))),
    }
}

/// Time from `now` until the next `hour:minute` UTC, today or tomorrow.
///
/// An out-of-range `hour`/`minute` falls back to midnight.
pub fn delay_until_next_run(now: DateTime<Utc>, hour: u32, minute: u32) -> Duration {
    let today = now.date_naive();
    let at = |date: chrono::NaiveDate| {
        date.and_hms_opt(hour, minute, 0)
            .or_else(|| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    };

    let next = at(today)
        .filter(|&run| run > now)
        .or_else(|| today.checked_add_days(Days::new(1)).and_then(at));

    next.and_then(|run| (run - now).to_std().ok())
        .unwrap_or(Duration::from_secs(24 * 60 * 60))
}
