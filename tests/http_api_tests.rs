#![cfg(feature = "http_api")]

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
};
use chrono::NaiveDate;
use serde_json::{Value, json};
use std::sync::Arc;
use study_planner::{
    FixedClock, JsonFilePlannerStore, PlannerStore, ScheduleEntry, SequentialIds, StudyPlanner,
    Subject, http_api,
};
use tower::util::ServiceExt;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn test_planner() -> StudyPlanner {
    StudyPlanner::with_collaborators(FixedClock::new(d(2026, 5, 4)), SequentialIds::new("h"))
}

fn new_router() -> axum::Router {
    http_api::router(http_api::AppState::new(test_planner()))
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn read_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn plan_lifecycle_via_http_api() {
    let app = new_router();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/subjects",
            json!({ "name": "Math", "examDate": "2026-05-07" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let subject: Subject = read_json(response).await;
    assert_eq!(subject.name, "Math");

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/subjects/{}/topics", subject.id),
            json!({ "name": "Algebra", "hoursNeeded": 5 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(json_request("PUT", "/budget", json!({ "dailyHourBudget": 2 })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(empty_request("POST", "/schedule/generate"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let report: Value = read_json(response).await;
    assert_eq!(report["sessions"], 3);
    assert_eq!(report["plannedHours"], 5.0);

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/schedule"))
        .await
        .unwrap();
    let schedule: Vec<ScheduleEntry> = read_json(response).await;
    let hours: Vec<f64> = schedule.iter().map(|e| e.hours).collect();
    assert_eq!(hours, vec![2.0, 2.0, 1.0]);

    let response = app
        .clone()
        .oneshot(empty_request(
            "POST",
            &format!("/schedule/{}/toggle", schedule[0].id),
        ))
        .await
        .unwrap();
    let toggled: ScheduleEntry = read_json(response).await;
    assert!(toggled.completed);

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/schedule/{}/date", schedule[1].id),
            json!({ "date": "2026-05-04" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/timetable?days=2"))
        .await
        .unwrap();
    let timetable: Value = read_json(response).await;
    assert_eq!(timetable.as_array().unwrap().len(), 2);
    assert_eq!(timetable[0]["overloaded"], true);
    assert_eq!(timetable[0]["totalHours"], 4.0);

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/summary"))
        .await
        .unwrap();
    let summary: Value = read_json(response).await;
    assert_eq!(summary["sessionCount"], 3);
    assert_eq!(summary["completedCount"], 1);

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", &format!("/subjects/{}", subject.id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(empty_request("GET", "/schedule"))
        .await
        .unwrap();
    let schedule: Vec<ScheduleEntry> = read_json(response).await;
    assert!(schedule.is_empty());
}

#[tokio::test]
async fn bad_requests_map_to_error_statuses() {
    let app = new_router();

    let response = app
        .clone()
        .oneshot(empty_request("POST", "/schedule/generate"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = read_json(response).await;
    assert_eq!(body["error"], "invalid_request");

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/subjects",
            json!({ "name": "History", "examDate": "2026-05-01" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(json_request("PUT", "/budget", json!({ "dailyHourBudget": 30 })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(empty_request("POST", "/schedule/missing/toggle"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = read_json(response).await;
    assert_eq!(body["error"], "not_found");

    let response = app
        .oneshot(empty_request("DELETE", "/subjects/missing/topics/t1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn mutations_are_saved_to_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(JsonFilePlannerStore::new(dir.path().join("planner.json")));
    let state = http_api::AppState::with_store(test_planner(), store.clone());
    let app = http_api::router(state);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/subjects",
            json!({ "name": "Art", "examDate": "2026-05-20" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let saved = store.load_state().unwrap().expect("saved state");
    assert_eq!(saved.subjects.len(), 1);
    assert_eq!(saved.subjects[0].name, "Art");

    let response = app
        .oneshot(empty_request("GET", "/health"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn timetable_rejects_oversized_ranges() {
    let app = new_router();

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/timetable?days=4000000000"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = read_json(response).await;
    assert_eq!(body["error"], "invalid_request");

    let response = app
        .oneshot(empty_request("GET", "/timetable?days=366"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let timetable: Value = read_json(response).await;
    assert_eq!(timetable.as_array().unwrap().len(), 366);
}

#[tokio::test]
async fn failed_save_rolls_back_the_change() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(JsonFilePlannerStore::new(
        dir.path().join("missing").join("planner.json"),
    ));
    let app = http_api::router(http_api::AppState::with_store(test_planner(), store));

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/subjects",
            json!({ "name": "Art", "examDate": "2026-05-20" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = read_json(response).await;
    assert_eq!(body["error"], "internal_error");

    let response = app
        .clone()
        .oneshot(json_request("PUT", "/budget", json!({ "dailyHourBudget": 6 })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/subjects"))
        .await
        .unwrap();
    let subjects: Vec<Subject> = read_json(response).await;
    assert!(subjects.is_empty());

    let response = app
        .oneshot(empty_request("GET", "/budget"))
        .await
        .unwrap();
    let budget: Value = read_json(response).await;
    assert_eq!(budget["dailyHourBudget"], 4.0);
}
