//! Router-level tests for the dashboard API.

use std::path::PathBuf;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use trainlog_core::storage::{append_records, load_records};
use trainlog_core::SetRecord;
use trainlog_server::{build_router, AppState};

fn setup(records: &[SetRecord]) -> (TempDir, PathBuf, Router) {
    let tmp = TempDir::new().unwrap();
    let store = tmp.path().join("progreso.csv");
    append_records(&store, records).unwrap();
    let app = build_router(AppState::new(store.clone()));
    (tmp, store, app)
}

fn squat_and_bench() -> Vec<SetRecord> {
    vec![
        SetRecord::new("Squat", "W1", 1, 100.0, 5),
        SetRecord::new("Squat", "W1", 2, 100.0, 5),
        SetRecord::new("Squat", "W2", 1, 105.0, 5),
        SetRecord::new("Bench", "W2", 1, 80.0, 5),
    ]
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes.to_vec())
}

async fn send_json(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, bytes) = send(app, method, uri, body).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_summary_filters() {
    let (_tmp, _store, app) = setup(&squat_and_bench());

    let (status, all) = send_json(&app, "GET", "/api/summary", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 3);

    let (_, w2) = send_json(&app, "GET", "/api/summary?week=W2", None).await;
    let exercises: Vec<&str> = w2
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["exercise"].as_str().unwrap())
        .collect();
    assert_eq!(exercises, vec!["Bench", "Squat"]);

    let (_, squat) = send_json(&app, "GET", "/api/summary?week=all&exercise=Squat", None).await;
    let squat = squat.as_array().unwrap();
    assert_eq!(squat.len(), 2);
    assert_eq!(squat[0]["estimated_one_rep_max"], json!(116.67));
    assert_eq!(squat[0]["volume_delta"], Value::Null);
    assert_eq!(squat[1]["volume_delta"], json!(-475.0));
}

#[tokio::test]
async fn test_overview_defaults_to_first_exercise() {
    let (_tmp, _store, app) = setup(&squat_and_bench());

    let (status, body) = send_json(&app, "GET", "/api/overview", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["week"], "all weeks");
    assert_eq!(body["weeks"], json!(["W1", "W2"]));
    assert_eq!(body["exercises"], json!(["Bench", "Squat"]));
    assert_eq!(body["exercise"], "Bench");
    assert_eq!(body["headline"]["total_reps"], 5);

    let (_, body) = send_json(&app, "GET", "/api/overview?week=W1&exercise=Squat", None).await;
    assert_eq!(body["exercises"], json!(["Squat"]));
    assert_eq!(body["rows"].as_array().unwrap().len(), 1);
    assert_eq!(body["headline"]["total_volume"], json!(1000.0));
}

#[tokio::test]
async fn test_empty_store_has_no_overview() {
    let tmp = TempDir::new().unwrap();
    let app = build_router(AppState::new(tmp.path().join("missing.csv")));

    let (status, body) = send_json(&app, "GET", "/api/overview", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["exercise"], Value::Null);
    assert_eq!(body["headline"], Value::Null);
    assert_eq!(body["rows"], json!([]));

    let (_, records) = send_json(&app, "GET", "/api/records", None).await;
    assert_eq!(records, json!([]));
}

#[tokio::test]
async fn test_session_flow_appends_to_store() {
    let (_tmp, store, app) = setup(&squat_and_bench());

    let (status, created) = send_json(&app, "POST", "/api/sessions", None).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["pending"], json!([]));

    for (weight, reps) in [(110.0, 3), (999.0, 1), (110.0, 2)] {
        let (status, _) = send_json(
            &app,
            "POST",
            &format!("/api/sessions/{id}/sets"),
            Some(json!({"exercise": "Squat", "week": "W2", "weight": weight, "reps": reps})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, session) =
        send_json(&app, "DELETE", &format!("/api/sessions/{id}/sets/1"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["pending"].as_array().unwrap().len(), 2);

    let (status, saved) = send_json(&app, "POST", &format!("/api/sessions/{id}/save"), None).await;
    assert_eq!(status, StatusCode::OK);
    let series: Vec<u64> = saved
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["series"].as_u64().unwrap())
        .collect();
    assert_eq!(series, vec![2, 3]);

    let (_, session) = send_json(&app, "GET", &format!("/api/sessions/{id}"), None).await;
    assert_eq!(session["pending"], json!([]));

    let stored = load_records(&store).unwrap();
    assert_eq!(stored.len(), 6);
    assert_eq!(stored[5], SetRecord::new("Squat", "W2", 3, 110.0, 2));

    let (status, _) = send(&app, "DELETE", &format!("/api/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", &format!("/api/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_session_errors() {
    let (_tmp, _store, app) = setup(&[]);

    let unknown = "00000000-0000-4000-8000-000000000000";
    let (status, _) = send(&app, "POST", &format!("/api/sessions/{unknown}/save"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, created) = send_json(&app, "POST", "/api/sessions", None).await;
    let id = created["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/sessions/{id}/sets"),
        Some(json!({"exercise": "Squat", "week": "W1", "weight": 100.0, "reps": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/sessions/{id}/sets"),
        Some(json!({"exercise": " ", "week": "W1", "weight": 100.0, "reps": 5})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "DELETE", &format!("/api/sessions/{id}/sets/0"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_idle_sessions_expire() {
    let tmp = TempDir::new().unwrap();
    let state = AppState::with_idle_timeout(tmp.path().join("progreso.csv"), Duration::ZERO);
    let app = build_router(state);

    let (_, first) = send_json(&app, "POST", "/api/sessions", None).await;
    let first = first["id"].as_str().unwrap().to_string();
    let (_, second) = send_json(&app, "POST", "/api/sessions", None).await;
    let second = second["id"].as_str().unwrap().to_string();

    let (status, _) = send(&app, "GET", &format!("/api/sessions/{first}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "GET", &format!("/api/sessions/{second}"), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_set_without_week_uses_current_label() {
    let (_tmp, _store, app) = setup(&[]);
    let (_, created) = send_json(&app, "POST", "/api/sessions", None).await;
    let id = created["id"].as_str().unwrap().to_string();

    let (_, session) = send_json(
        &app,
        "POST",
        &format!("/api/sessions/{id}/sets"),
        Some(json!({"exercise": "Curl", "weight": 12.5, "reps": 12})),
    )
    .await;
    let expected = trainlog_core::WeekLabel::current().to_string();
    assert_eq!(session["pending"][0]["week"], json!(expected));
}

#[tokio::test]
async fn test_chart_is_svg() {
    let (_tmp, _store, app) = setup(&squat_and_bench());

    let request = Request::builder()
        .uri("/api/charts/Squat/total-volume")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/svg+xml");
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let svg = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(svg.contains("<svg"));
    assert!(svg.contains("Total volume per week"));

    let (status, _) = send(&app, "GET", "/api/charts/Deadlift/mean-weight", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // A single week has no volume change to draw.
    let (status, _) = send(&app, "GET", "/api/charts/Bench/volume-delta", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
