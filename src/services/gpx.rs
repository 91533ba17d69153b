// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! GPX 1.1 track documents.
//!
//! Heart rate and cadence go in a Garmin `TrackPointExtension` block.
//! Consumers (Garmin Connect, Komoot, other platforms) only recognize it
//! under the `gpxtpx` prefix, so the writer binds prefixes explicitly
//! instead of letting a generic serializer pick one.

use crate::error::{AppError, Result};
use crate::markup::escape_into;
use crate::models::StreamBundle;
use crate::time_utils::format_utc_rfc3339;
use chrono::{DateTime, TimeDelta, Utc};

/// Media type for GPX downloads.
pub const GPX_MEDIA_TYPE: &str = "application/gpx+xml";

/// Default GPX namespace.
pub const GPX_NAMESPACE: &str = "http://www.topografix.com/GPX/1/1";

const GPX_SCHEMA_LOCATION: &str = "http://www.topografix.com/GPX/1/1 \
     http://www.topografix.com/GPX/1/1/gpx.xsd \
     http://www.garmin.com/xmlschemas/TrackPointExtension/v1 \
     http://www.garmin.com/xmlschemas/TrackPointExtensionv1.xsd";

const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

const CREATOR: &str = "strava-noshoes";

/// A namespace URI bound to a fixed prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamespaceBinding {
    pub prefix: &'static str,
    pub uri: &'static str,
}

impl NamespaceBinding {
    /// `prefix:local`
    pub fn qualify(&self, local: &str) -> String {
        format!("{}:{}", self.prefix, local)
    }

    /// `xmlns:prefix` attribute name.
    pub fn declaration(&self) -> String {
        format!("xmlns:{}", self.prefix)
    }
}

/// Garmin track point extension namespace.
pub const TRACK_POINT_EXTENSION: NamespaceBinding = NamespaceBinding {
    prefix: "gpxtpx",
    uri: "http://www.garmin.com/xmlschemas/TrackPointExtension/v1",
};

/// Heart rate and cadence for one point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackPointExtension {
    pub heart_rate: Option<f64>,
    pub cadence: Option<f64>,
}

/// One recorded position.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: Option<f64>,
    pub time: Option<DateTime<Utc>>,
    pub extension: Option<TrackPointExtension>,
}

/// Single-track, single-segment GPX document.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackDocument {
    pub name: String,
    pub description: String,
    pub points: Vec<TrackPoint>,
}

impl TrackDocument {
    /// Build a track from an activity's streams.
    ///
    /// One point per position sample. Timestamps are `start + time[i]`;
    /// elevation, time, heart rate and cadence are omitted at indexes their
    /// streams do not reach. Fails if there is no position stream.
    pub fn from_streams(
        activity_id: u64,
        name: &str,
        start: DateTime<Utc>,
        streams: &StreamBundle,
    ) -> Result<Self> {
        let positions = streams
            .positions()
            .ok_or_else(|| AppError::no_gps_data(activity_id))?;

        let points = positions
            .iter()
            .enumerate()
            .map(|(i, &[latitude, longitude])| {
                let time = streams
                    .elapsed_at(i)
                    .and_then(TimeDelta::try_seconds)
                    .and_then(|offset| start.checked_add_signed(offset));

                let heart_rate = streams.heartrate_at(i);
                let cadence = streams.cadence_at(i);
                let extension = (heart_rate.is_some() || cadence.is_some())
                    .then_some(TrackPointExtension {
                        heart_rate,
                        cadence,
                    });

                TrackPoint {
                    latitude,
                    longitude,
                    elevation: streams.altitude_at(i),
                    time,
                    extension,
                }
            })
            .collect();

        Ok(Self {
            name: name.to_string(),
            description: format!("Strava Activity {}", activity_id),
            points,
        })
    }

    /// Serialize to GPX 1.1 XML.
    pub fn to_xml(&self) -> String {
        let tpx = TRACK_POINT_EXTENSION;
        let tpx_declaration = tpx.declaration();
        let mut w = XmlWriter::with_capacity(256 + self.points.len() * 160);

        w.declaration();
        w.open(
            "gpx",
            &[
                ("xmlns", GPX_NAMESPACE),
                (tpx_declaration.as_str(), tpx.uri),
                ("xmlns:xsi", XSI_NAMESPACE),
                ("xsi:schemaLocation", GPX_SCHEMA_LOCATION),
                ("version", "1.1"),
                ("creator", CREATOR),
            ],
        );

        w.open("metadata", &[]);
        w.leaf("name", &self.name);
        w.leaf("desc", &self.description);
        w.close("metadata");

        w.open("trk", &[]);
        w.leaf("name", &self.name);
        w.open("trkseg", &[]);
        for point in &self.points {
            let lat = point.latitude.to_string();
            let lon = point.longitude.to_string();
            w.open("trkpt", &[("lat", lat.as_str()), ("lon", lon.as_str())]);

            if let Some(elevation) = point.elevation {
                w.leaf("ele", &elevation.to_string());
            }
            if let Some(time) = point.time {
                w.leaf("time", &format_utc_rfc3339(time));
            }
            if let Some(ext) = &point.extension {
                let block = tpx.qualify("TrackPointExtension");
                w.open("extensions", &[]);
                w.open(&block, &[]);
                if let Some(hr) = ext.heart_rate {
                    w.leaf(&tpx.qualify("hr"), &hr.to_string());
                }
                if let Some(cad) = ext.cadence {
                    w.leaf(&tpx.qualify("cad"), &cad.to_string());
                }
                w.close(&block);
                w.close("extensions");
            }

            w.close("trkpt");
        }
        w.close("trkseg");
        w.close("trk");
        w.close("gpx");

        w.finish()
    }
}

/// Minimal indenting XML writer. Element names are written as given.
struct XmlWriter {
    out: String,
    depth: usize,
}

impl XmlWriter {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            out: String::with_capacity(capacity),
            depth: 0,
        }
    }

    fn declaration(&mut self) {
        self.out
            .push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    }

    fn indent(&mut self) {
        for _ in 0..self.depth {
            self.out.push_str("  ");
        }
    }

    fn start_tag(&mut self, tag: &str, attrs: &[(&str, &str)]) {
        self.indent();
        self.out.push('<');
        self.out.push_str(tag);
        for (name, value) in attrs {
            self.out.push(' ');
            self.out.push_str(name);
            self.out.push_str("=\"");
            escape_into(&mut self.out, value);
            self.out.push('"');
        }
        self.out.push('>');
    }

    fn open(&mut self, tag: &str, attrs: &[(&str, &str)]) {
        self.start_tag(tag, attrs);
        self.out.push('\n');
        self.depth += 1;
    }

    fn close(&mut self, tag: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.indent();
        self.out.push_str("</");
        self.out.push_str(tag);
        self.out.push_str(">\n");
    }

    fn leaf(&mut self, tag: &str, text: &str) {
        self.start_tag(tag, &[]);
        escape_into(&mut self.out, text);
        self.out.push_str("</");
        self.out.push_str(tag);
        self.out.push_str(">\n");
    }

    fn finish(self) -> String {
        self.out
    }
}
