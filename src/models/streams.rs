// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Per-activity time-series streams (`key_by_type=true` response shape).

use serde::Deserialize;

/// Stream keys requested for track synthesis.
pub const TRACK_STREAM_KEYS: [&str; 5] = ["latlng", "altitude", "time", "heartrate", "cadence"];

/// One stream: a sequence of samples for a single quantity.
#[derive(Debug, Clone, Deserialize)]
pub struct Stream<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub series_type: Option<String>,
    #[serde(default)]
    pub original_size: Option<usize>,
    #[serde(default)]
    pub resolution: Option<String>,
}

/// Streams for one activity, keyed by type.
///
/// Streams may have different lengths. The position stream is the
/// authoritative length; other streams are read with bounds checks.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreamBundle {
    /// `[latitude, longitude]` pairs
    #[serde(default)]
    pub latlng: Option<Stream<[f64; 2]>>,
    /// Elevation in meters
    #[serde(default)]
    pub altitude: Option<Stream<f64>>,
    /// Seconds elapsed since the activity start
    #[serde(default)]
    pub time: Option<Stream<i64>>,
    /// Beats per minute
    #[serde(default)]
    pub heartrate: Option<Stream<f64>>,
    /// Revolutions (or steps) per minute
    #[serde(default)]
    pub cadence: Option<Stream<f64>>,
}

impl StreamBundle {
    pub fn positions(&self) -> Option<&[[f64; 2]]> {
        self.latlng.as_ref().map(|s| s.data.as_slice())
    }

    pub fn elapsed_at(&self, i: usize) -> Option<i64> {
        sample(&self.time, i)
    }

    pub fn altitude_at(&self, i: usize) -> Option<f64> {
        sample(&self.altitude, i)
    }

    pub fn heartrate_at(&self, i: usize) -> Option<f64> {
        sample(&self.heartrate, i)
    }

    pub fn cadence_at(&self, i: usize) -> Option<f64> {
        sample(&self.cadence, i)
    }
}

fn sample<T: Copy>(stream: &Option<Stream<T>>, i: usize) -> Option<T> {
    stream.as_ref().and_then(|s| s.data.get(i).copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_keyed_bundle_with_missing_streams() {
        let json = serde_json::json!({
            "latlng": {"data": [[37.1, -122.1], [37.2, -122.2]], "series_type": "distance",
                       "original_size": 2, "resolution": "high"},
            "time": {"data": [0, 5], "series_type": "distance", "original_size": 2,
                     "resolution": "high"},
            "heartrate": {"data": [120]}
        });

        let bundle: StreamBundle = serde_json::from_value(json).unwrap();

        assert_eq!(bundle.positions().map(|p| p.len()), Some(2));
        assert_eq!(bundle.elapsed_at(1), Some(5));
        assert_eq!(bundle.heartrate_at(0), Some(120.0));
        assert_eq!(bundle.heartrate_at(1), None);
        assert_eq!(bundle.altitude_at(0), None);
        assert!(bundle.cadence.is_none());
    }
}
