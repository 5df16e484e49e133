use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use chrono::NaiveDate;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::constants::{MAX_TIMETABLE_DAYS, TIMETABLE_DAYS};
use crate::{
    GenerationReport, PlannerError, PlannerState, PlannerStore, PlannerSummary, RebalanceReport,
    ScheduleEntry, StudyPlanner, Subject, TimetableDay, Topic,
};

type SharedStore = Arc<dyn PlannerStore + Send + Sync>;

#[derive(Clone)]
pub struct AppState {
    planner: Arc<RwLock<StudyPlanner>>,
    store: Option<SharedStore>,
}

impl AppState {
    pub fn new(planner: StudyPlanner) -> Self {
        Self {
            planner: Arc::new(RwLock::new(planner)),
            store: None,
        }
    }

    /// Saves the full planner state to `store` after every mutating request.
    pub fn with_store(planner: StudyPlanner, store: SharedStore) -> Self {
        Self {
            planner: Arc::new(RwLock::new(planner)),
            store: Some(store),
        }
    }

    fn planner(&self) -> Arc<RwLock<StudyPlanner>> {
        self.planner.clone()
    }

    fn persist(&self, state: &PlannerState) -> Result<(), ApiError> {
        if let Some(store) = &self.store {
            store.save_state(state).map_err(|err| {
                log::error!("failed to persist planner state: {err}");
                ApiError::internal(format!("failed to persist planner state: {err}"))
            })?;
        }
        Ok(())
    }

    /// Runs a mutation under the write lock and persists the resulting state.
    ///
    /// When saving fails the planner is put back to its state before the
    /// mutation, so memory never runs ahead of the store.
    fn mutate<T, F>(&self, mutation: F) -> Result<T, ApiError>
    where
        F: FnOnce(&mut StudyPlanner) -> Result<T, ApiError>,
    {
        let planner = self.planner();
        let mut guard = planner.write();
        let before = self.store.as_ref().map(|_| guard.state());
        let value = mutation(&mut guard)?;
        let saved = self.persist(&guard.state());
        if let Err(err) = saved {
            if let Some(before) = before {
                if let Err(restore_err) = guard.restore(before) {
                    log::error!("failed to roll back planner state: {restore_err}");
                }
            }
            return Err(err);
        }
        Ok(value)
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Invalid(String),
    Internal(String),
}

impl ApiError {
    fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }
}

impl From<PlannerError> for ApiError {
    fn from(value: PlannerError) -> Self {
        match value {
            PlannerError::NotFound { .. } => ApiError::NotFound(value.to_string()),
            PlannerError::InvalidInput { .. } => ApiError::Invalid(value.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewSubjectPayload {
    name: String,
    exam_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewTopicPayload {
    name: String,
    hours_needed: f64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BudgetPayload {
    daily_hour_budget: f64,
}

#[derive(Debug, Deserialize)]
struct MovePayload {
    date: NaiveDate,
}

#[derive(Debug, Deserialize)]
struct TimetableQuery {
    days: Option<u32>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/subjects", get(list_subjects).post(create_subject))
        .route("/subjects/:id", delete(delete_subject))
        .route("/subjects/:id/topics", post(create_topic))
        .route("/subjects/:id/topics/:topic_id", delete(delete_topic))
        .route("/budget", get(get_budget).put(update_budget))
        .route("/schedule", get(list_schedule))
        .route("/schedule/generate", post(generate_schedule))
        .route("/schedule/rebalance", post(rebalance_schedule))
        .route("/schedule/:id/toggle", post(toggle_entry))
        .route("/schedule/:id/date", put(move_entry))
        .route("/timetable", get(timetable))
        .route("/summary", get(summary))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("study planner HTTP API listening on http://{addr}");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn list_subjects(State(state): State<AppState>) -> Json<Vec<Subject>> {
    let planner = state.planner();
    let subjects = planner.read().subjects().to_vec();
    Json(subjects)
}

async fn create_subject(
    State(state): State<AppState>,
    Json(payload): Json<NewSubjectPayload>,
) -> Result<(StatusCode, Json<Subject>), ApiError> {
    let subject = state.mutate(|planner| {
        Ok(planner
            .add_subject(&payload.name, payload.exam_date)?
            .clone())
    })?;
    Ok((StatusCode::CREATED, Json(subject)))
}

async fn delete_subject(
    State(state): State<AppState>,
    Path(subject_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.mutate(|planner| Ok(planner.remove_subject(&subject_id)?))?;
    Ok(StatusCode::NO_CONTENT)
}

async fn create_topic(
    State(state): State<AppState>,
    Path(subject_id): Path<String>,
    Json(payload): Json<NewTopicPayload>,
) -> Result<(StatusCode, Json<Topic>), ApiError> {
    let topic = state.mutate(|planner| {
        Ok(planner
            .add_topic(&subject_id, &payload.name, payload.hours_needed)?
            .clone())
    })?;
    Ok((StatusCode::CREATED, Json(topic)))
}

async fn delete_topic(
    State(state): State<AppState>,
    Path((subject_id, topic_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    state.mutate(|planner| Ok(planner.remove_topic(&subject_id, &topic_id)?))?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_budget(State(state): State<AppState>) -> Json<BudgetPayload> {
    let planner = state.planner();
    let daily_hour_budget = planner.read().daily_hour_budget();
    Json(BudgetPayload { daily_hour_budget })
}

async fn update_budget(
    State(state): State<AppState>,
    Json(payload): Json<BudgetPayload>,
) -> Result<Json<BudgetPayload>, ApiError> {
    let daily_hour_budget = state.mutate(|planner| {
        planner.set_daily_hour_budget(payload.daily_hour_budget)?;
        Ok(planner.daily_hour_budget())
    })?;
    Ok(Json(BudgetPayload { daily_hour_budget }))
}

async fn list_schedule(State(state): State<AppState>) -> Json<Vec<ScheduleEntry>> {
    let planner = state.planner();
    let schedule = planner.read().schedule().to_vec();
    Json(schedule)
}

async fn generate_schedule(
    State(state): State<AppState>,
) -> Result<Json<GenerationReport>, ApiError> {
    let report = state.mutate(|planner| Ok(planner.generate()?))?;
    Ok(Json(report))
}

async fn rebalance_schedule(
    State(state): State<AppState>,
) -> Result<Json<RebalanceReport>, ApiError> {
    let report = state.mutate(|planner| Ok(planner.reschedule_missed()))?;
    Ok(Json(report))
}

async fn toggle_entry(
    State(state): State<AppState>,
    Path(entry_id): Path<String>,
) -> Result<Json<ScheduleEntry>, ApiError> {
    let entry = state.mutate(|planner| {
        planner.toggle_completed(&entry_id)?;
        planner
            .find_entry(&entry_id)
            .cloned()
            .ok_or_else(|| ApiError::internal("session not found after toggle"))
    })?;
    Ok(Json(entry))
}

async fn move_entry(
    State(state): State<AppState>,
    Path(entry_id): Path<String>,
    Json(payload): Json<MovePayload>,
) -> Result<Json<ScheduleEntry>, ApiError> {
    let entry = state.mutate(|planner| Ok(planner.move_entry(&entry_id, payload.date)?.clone()))?;
    Ok(Json(entry))
}

async fn timetable(
    State(state): State<AppState>,
    Query(query): Query<TimetableQuery>,
) -> Result<Json<Vec<TimetableDay>>, ApiError> {
    let days = query.days.unwrap_or(TIMETABLE_DAYS);
    if days > MAX_TIMETABLE_DAYS {
        return Err(ApiError::Invalid(format!(
            "days must be at most {MAX_TIMETABLE_DAYS}, got {days}"
        )));
    }
    let planner = state.planner();
    let timetable = planner.read().timetable(days);
    Ok(Json(timetable))
}

async fn summary(State(state): State<AppState>) -> Json<PlannerSummary> {
    let planner = state.planner();
    let summary = planner.read().summary();
    Json(summary)
}
