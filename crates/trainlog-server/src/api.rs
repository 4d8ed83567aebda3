//! REST API handlers for trainlog-server.
//!
//! Every read reloads the record store and recomputes the summary.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use trainlog_core::dashboard::{self, Headline, WeekFilter};
use trainlog_core::{compute_summary, storage, Session, SummaryRecord, TrainlogError, WeekLabel};

use crate::chart::{self, ChartMetric};
use crate::state::AppState;

// ─── Router ──────────────────────────────────────────────────────────────────

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/records", get(list_records))
        .route("/summary", get(get_summary))
        .route("/weeks", get(list_weeks))
        .route("/exercises", get(list_exercises))
        .route("/overview", get(get_overview))
        .route("/charts/{exercise}/{metric}", get(get_chart))
        .route("/sessions", post(create_session))
        .route("/sessions/{id}", get(get_session).delete(delete_session))
        .route("/sessions/{id}/sets", post(add_set))
        .route("/sessions/{id}/sets/{index}", delete(remove_set))
        .route("/sessions/{id}/save", post(save_session))
        .route("/config", get(get_server_config))
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn error_response(e: TrainlogError) -> Response {
    let status = match e {
        TrainlogError::InvalidSet(_) | TrainlogError::InvalidWeek(_) => StatusCode::BAD_REQUEST,
        TrainlogError::PendingSetNotFound { .. } => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, e.to_string()).into_response()
}

fn session_not_found(id: Uuid) -> Response {
    (StatusCode::NOT_FOUND, format!("Session not found: {id}")).into_response()
}

fn load_summary(state: &AppState) -> trainlog_core::Result<Vec<SummaryRecord>> {
    let records = storage::load_records(&state.store_path)?;
    Ok(compute_summary(&records))
}

fn session_json(id: Uuid, session: &Session) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "pending": session.pending(),
    })
}

// ─── Records and summary ─────────────────────────────────────────────────────

async fn list_records(State(state): State<AppState>) -> impl IntoResponse {
    match storage::load_records(&state.store_path) {
        Ok(records) => Json(records).into_response(),
        Err(e) => error_response(e),
    }
}

/// Query params shared by the summary views. A missing or "all" week
/// means every week.
#[derive(Deserialize, Default)]
struct SummaryQuery {
    week: Option<String>,
    exercise: Option<String>,
}

async fn get_summary(
    State(state): State<AppState>,
    Query(q): Query<SummaryQuery>,
) -> impl IntoResponse {
    let summary = match load_summary(&state) {
        Ok(s) => s,
        Err(e) => return error_response(e),
    };
    let filter = WeekFilter::from_option(q.week.as_deref());
    let rows: Vec<&SummaryRecord> = summary
        .iter()
        .filter(|r| filter.matches(&r.week))
        .filter(|r| q.exercise.as_deref().map_or(true, |e| r.exercise == e))
        .collect();
    Json(rows).into_response()
}

async fn list_weeks(State(state): State<AppState>) -> impl IntoResponse {
    match load_summary(&state) {
        Ok(summary) => Json(dashboard::available_weeks(&summary)).into_response(),
        Err(e) => error_response(e),
    }
}

#[derive(Deserialize, Default)]
struct WeekQuery {
    week: Option<String>,
}

async fn list_exercises(
    State(state): State<AppState>,
    Query(q): Query<WeekQuery>,
) -> impl IntoResponse {
    match load_summary(&state) {
        Ok(summary) => {
            let filter = WeekFilter::from_option(q.week.as_deref());
            Json(dashboard::available_exercises(&summary, &filter)).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// The dashboard's main view: one exercise within a week filter, with
/// headline figures. Defaults to the first exercise available.
async fn get_overview(
    State(state): State<AppState>,
    Query(q): Query<SummaryQuery>,
) -> impl IntoResponse {
    let summary = match load_summary(&state) {
        Ok(s) => s,
        Err(e) => return error_response(e),
    };
    let filter = WeekFilter::from_option(q.week.as_deref());
    let exercises = dashboard::available_exercises(&summary, &filter);
    let exercise = q.exercise.or_else(|| exercises.first().cloned());

    let rows = exercise
        .as_deref()
        .map(|e| dashboard::select(&summary, &filter, e))
        .unwrap_or_default();
    let headline = (!rows.is_empty()).then(|| Headline::from_rows(&rows));

    Json(serde_json::json!({
        "week": filter.label(),
        "weeks": dashboard::available_weeks(&summary),
        "exercises": exercises,
        "exercise": exercise,
        "headline": headline,
        "rows": rows,
    }))
    .into_response()
}

async fn get_chart(
    State(state): State<AppState>,
    Path((exercise, metric)): Path<(String, ChartMetric)>,
) -> impl IntoResponse {
    let summary = match load_summary(&state) {
        Ok(s) => s,
        Err(e) => return error_response(e),
    };
    let history = dashboard::exercise_history(&summary, &exercise);
    match chart::render(metric, &history) {
        Ok(Some(svg)) => ([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            format!("No data available for {exercise}"),
        )
            .into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

// ─── Entry sessions ──────────────────────────────────────────────────────────

async fn create_session(State(state): State<AppState>) -> impl IntoResponse {
    let id = state.open_session();
    info!(session = %id, "Session opened");
    (StatusCode::CREATED, Json(session_json(id, &Session::new())))
}

async fn get_session(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    match state.with_session(id, |session| session_json(id, session)) {
        Some(body) => Json(body).into_response(),
        None => session_not_found(id),
    }
}

async fn delete_session(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    if state.close_session(id) {
        StatusCode::NO_CONTENT.into_response()
    } else {
        session_not_found(id)
    }
}

#[derive(Deserialize)]
struct NewSet {
    exercise: String,
    /// Defaults to the current week's label
    week: Option<String>,
    weight: f64,
    reps: u32,
}

async fn add_set(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(set): Json<NewSet>,
) -> impl IntoResponse {
    let week = set.week.unwrap_or_else(|| WeekLabel::current().to_string());
    let added = state.with_session(id, |session| {
        session.add(set.exercise, week, set.weight, set.reps)?;
        Ok::<_, TrainlogError>(session_json(id, session))
    });
    match added {
        Some(Ok(body)) => (StatusCode::CREATED, Json(body)).into_response(),
        Some(Err(e)) => error_response(e),
        None => session_not_found(id),
    }
}

async fn remove_set(
    State(state): State<AppState>,
    Path((id, index)): Path<(Uuid, usize)>,
) -> impl IntoResponse {
    match state.with_session(id, |s| s.remove(index).map(|_| session_json(id, s))) {
        Some(Ok(body)) => Json(body).into_response(),
        Some(Err(e)) => error_response(e),
        None => session_not_found(id),
    }
}

async fn save_session(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    match state.with_session(id, |s| s.save(&state.store_path)) {
        Some(Ok(saved)) => {
            info!(session = %id, sets = saved.len(), "Session saved");
            Json(saved).into_response()
        }
        Some(Err(e)) => error_response(e),
        None => session_not_found(id),
    }
}

async fn get_server_config(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "store_path": state.store_path.display().to_string(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
