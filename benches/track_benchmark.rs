use chrono::{TimeZone, Utc};
use criterion::{criterion_group, criterion_main, Criterion};
use serde_json::json;
use std::hint::black_box;
use strava_noshoes::models::StreamBundle;
use strava_noshoes::services::TrackDocument;

/// Streams for a ~3 hour activity sampled every second.
fn synthetic_streams(points: usize) -> StreamBundle {
    let latlng: Vec<[f64; 2]> = (0..points)
        .map(|i| {
            let t = i as f64 / points as f64;
            [37.35 + 0.05 * t, -122.20 + 0.03 * (t * 12.0).sin()]
        })
        .collect();
    let altitude: Vec<f64> = (0..points).map(|i| 50.0 + (i as f64 / 60.0).sin() * 20.0).collect();
    let time: Vec<i64> = (0..points as i64).collect();
    let heartrate: Vec<f64> = (0..points).map(|i| 130.0 + (i % 40) as f64).collect();
    let cadence: Vec<f64> = (0..points).map(|i| 84.0 + (i % 6) as f64).collect();

    serde_json::from_value(json!({
        "latlng": {"data": latlng},
        "altitude": {"data": altitude},
        "time": {"data": time},
        "heartrate": {"data": heartrate},
        "cadence": {"data": cadence},
    }))
    .expect("Failed to build streams")
}

fn benchmark_track_serialization(c: &mut Criterion) {
    let start = Utc.with_ymd_and_hms(2024, 5, 1, 6, 30, 0).unwrap();
    let streams = synthetic_streams(10_800);

    let mut group = c.benchmark_group("gpx");

    group.bench_function("build_document", |b| {
        b.iter(|| TrackDocument::from_streams(42, "Long Run", start, black_box(&streams)))
    });

    let document =
        TrackDocument::from_streams(42, "Long Run", start, &streams).expect("Failed to build track");
    group.bench_function("to_xml", |b| b.iter(|| black_box(&document).to_xml()));

    group.finish();
}

criterion_group!(benches, benchmark_track_serialization);
criterion_main!(benches);
