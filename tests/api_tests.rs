// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP surface: validation, pagination, stats and notifications.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{Duration, Utc};
use common::{activity_json, gear_json, API};
use serde_json::Value;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;

async fn get(app: axum::Router, uri: &str) -> axum::response::Response {
    app.oneshot(
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Five recent activities: ids 1-3 are runs with gear, 4-5 rides without.
async fn mount_recent_activities(server: &MockServer) {
    let now = Utc::now();
    let activities: Vec<Value> = (1..=5u64)
        .map(|id| {
            let (sport, gear) = if id <= 3 { ("Run", Some("g1")) } else { ("Ride", None) };
            activity_json(id, sport, now - Duration::hours(id as i64), gear)
        })
        .collect();

    Mock::given(method("GET"))
        .and(path(format!("{}/athlete/activities", API)))
        .respond_with(ResponseTemplate::new(200).set_body_json(Value::Array(activities)))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{}/gear/g1", API)))
        .respond_with(ResponseTemplate::new(200).set_body_json(gear_json("g1", "Pegasus 40")))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_health() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let (app, _state) = common::create_test_app(&server, dir.path());

    let response = get(app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["app"], "Strava NoShoes");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_api_root() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let (app, _state) = common::create_test_app(&server, dir.path());

    let body = common::body_json(get(app, "/api/v1").await).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_invalid_query_parameters_are_rejected() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    // Nothing should reach the remote API.
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (app, _state) = common::create_test_app(&server, dir.path());

    for uri in [
        "/api/v1/activities?page=0",
        "/api/v1/activities?per_page=0",
        "/api/v1/activities?per_page=201",
        "/api/v1/activities?after=invalid-date",
        "/api/v1/activities?before=2024-13-01",
        "/api/v1/activities/running?limit=0",
        "/api/v1/activities/running?limit=1001",
        "/api/v1/stats/summary?range=2w",
        "/api/v1/notifications/gearless?days_back=0",
        "/auth/strava/callback",
        "/auth/strava/callback?error=access_denied",
    ] {
        let response = get(app.clone(), uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);

        let body = common::body_json(response).await;
        assert_eq!(body["error"], "bad_request", "{}", uri);
    }
}

#[tokio::test]
async fn test_activities_paginated_in_memory() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_recent_activities(&server).await;

    let (app, _state) = common::create_test_app(&server, dir.path());
    let body = common::body_json(get(app, "/api/v1/activities?page=2&per_page=2").await).await;

    assert_eq!(body["total"], 5);
    assert_eq!(body["page"], 2);
    assert_eq!(body["per_page"], 2);
    assert_eq!(body["total_pages"], 3);

    let ids: Vec<u64> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![3, 4]);
    assert_eq!(body["items"][0]["gear_name"], "Pegasus 40");
}

#[tokio::test]
async fn test_activities_filters_from_query() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_recent_activities(&server).await;

    let (app, _state) = common::create_test_app(&server, dir.path());

    let body = common::body_json(get(app.clone(), "/api/v1/activities?has_gear=false").await).await;
    assert_eq!(body["total"], 2);

    let body =
        common::body_json(get(app.clone(), "/api/v1/activities?activity_type=Run&gear_id=g1").await)
            .await;
    assert_eq!(body["total"], 3);

    let no_gear = common::body_json(get(app, "/api/v1/activities/no-gear").await).await;
    assert_eq!(no_gear.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_stats_summary() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_recent_activities(&server).await;

    let (app, _state) = common::create_test_app(&server, dir.path());
    let body = common::body_json(get(app, "/api/v1/stats/summary?range=1w").await).await;

    assert_eq!(body["total"]["count"], 5);
    assert_eq!(body["total"]["distance_km"], 25.0);
    assert_eq!(body["total"]["time_seconds"], 9000);
    assert_eq!(body["total"]["time_hours"], 2.5);
    assert_eq!(body["total"]["activities_without_gear"], 2);
    assert_eq!(body["activity_types_count"]["Run"], 3);
    assert_eq!(body["activity_types_count"]["Ride"], 2);
    assert_eq!(body["activity_types_detailed"]["Run"]["distance_km"], 15.0);
    assert_eq!(body["activity_types_detailed"]["Ride"]["time_hours"], 1.0);
}

#[tokio::test]
async fn test_gearless_notification() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_recent_activities(&server).await;

    let (app, _state) = common::create_test_app(&server, dir.path());
    let body = common::body_json(get(app, "/api/v1/notifications/gearless?days_back=7").await).await;

    assert_eq!(body["count"], 2);
    let message = body["message"].as_str().unwrap();
    assert!(message.starts_with("⚠️ Found 2 activities without gear (last 7 days):"));
    assert!(message.contains("https://www.strava.com/activities/4"));
}

#[tokio::test]
async fn test_gearless_notification_when_all_good() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path(format!("{}/athlete/activities", API)))
        .respond_with(ResponseTemplate::new(200).set_body_json(Value::Array(vec![])))
        .mount(&server)
        .await;

    let (app, _state) = common::create_test_app(&server, dir.path());
    let body = common::body_json(get(app, "/api/v1/notifications/gearless").await).await;

    assert_eq!(body["count"], 0);
    assert!(body["message"].is_null());
}

#[tokio::test]
async fn test_activity_by_id_has_gear_name() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path(format!("{}/activities/9", API)))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(activity_json(9, "Run", Utc::now(), Some("g1"))),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{}/gear/g1", API)))
        .respond_with(ResponseTemplate::new(200).set_body_json(gear_json("g1", "Pegasus 40")))
        .expect(1)
        .mount(&server)
        .await;

    let (app, _state) = common::create_test_app(&server, dir.path());
    let body = common::body_json(get(app, "/api/v1/activities/9").await).await;

    assert_eq!(body["id"], 9);
    assert_eq!(body["gear_name"], "Pegasus 40");
    assert_eq!(body["type"], "Run");
}

#[tokio::test]
async fn test_upstream_failure_is_bad_gateway() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path(format!("{}/athlete", API)))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let (app, _state) = common::create_test_app(&server, dir.path());
    let response = get(app, "/api/v1/athlete").await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = common::body_json(response).await;
    assert_eq!(body["error"], "strava_error");
    assert!(body["details"].as_str().unwrap().contains("500"));
}

#[tokio::test]
async fn test_gpx_for_unknown_activity_passes_through_upstream_error() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path(format!("{}/activities/404", API)))
        .respond_with(ResponseTemplate::new(404).set_body_string("Record Not Found"))
        .mount(&server)
        .await;

    let (app, _state) = common::create_test_app(&server, dir.path());
    let response = get(app, "/api/v1/activities/404/gpx").await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}
