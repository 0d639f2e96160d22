use std::sync::Arc;

use axum::body::to_bytes;
use axum::http::StatusCode;
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use schedule_cell::router::{schedule_routes, ScheduleState};
use schedule_cell::services::availability::AvailabilityService;
use shared_models::auth::{Actor, Role};
use shared_models::policy::PolicyEngine;
use shared_store::SchedulingStore;
use shared_utils::test_utils::{authed_get, authed_json_request, test_actor};

fn test_app() -> (Router, Arc<SchedulingStore>) {
    let store = Arc::new(SchedulingStore::new());
    let state = ScheduleState {
        availability: Arc::new(AvailabilityService::new(Arc::clone(&store))),
        policy: PolicyEngine::new(),
    };
    (schedule_routes(state), store)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn doctor_creates_and_lists_own_schedule() {
    let (app, _store) = test_app();
    let doctor = test_actor(Role::Doctor);
    let date = "2026-09-21";

    let response = app
        .clone()
        .oneshot(authed_json_request(
            "PUT",
            &format!("/doctors/{}/dates/{}", doctor.id, date),
            &doctor,
            json!({
                "start_time": "09:00:00",
                "end_time": "12:00:00",
                "duration_minutes": 30,
                "slot_type": "consult"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(authed_get(
            &format!("/doctors/{}/dates/{}/available", doctor.id, date),
            &doctor,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["slots"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn another_doctor_cannot_manage_the_schedule() {
    let (app, _store) = test_app();
    let owner = Uuid::new_v4();
    let intruder = test_actor(Role::Doctor);

    let response = app
        .oneshot(authed_json_request(
            "PUT",
            &format!("/doctors/{}/dates/2026-09-21", owner),
            &intruder,
            json!({
                "start_time": "09:00:00",
                "end_time": "10:00:00",
                "duration_minutes": 30,
                "slot_type": "consult"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_replace_range_reports_booked_slot_removal() {
    let (app, store) = test_app();
    let admin = test_actor(Role::Admin);
    let doctor = Uuid::new_v4();
    let date = "2026-09-21";

    let response = app
        .clone()
        .oneshot(authed_json_request(
            "PUT",
            &format!("/doctors/{}/dates/{}", doctor, date),
            &admin,
            json!({
                "start_time": "09:00:00",
                "end_time": "11:00:00",
                "duration_minutes": 30,
                "slot_type": "consult"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    store
        .book_slot(
            doctor,
            date.parse().unwrap(),
            "09:30:00".parse().unwrap(),
            shared_store::AppointmentDraft {
                patient_id: Uuid::new_v4(),
                patient_name: "Jordan Reyes".to_string(),
                doctor_name: "Dr. Amaya Okafor".to_string(),
                address: "12 Harbor Lane".to_string(),
            },
            chrono::Utc::now(),
        )
        .await
        .unwrap();

    let response = app
        .oneshot(authed_json_request(
            "PATCH",
            &format!("/doctors/{}/dates/{}/range", doctor, date),
            &admin,
            json!({
                "range_start": "09:00:00",
                "range_end": "10:00:00",
                "duration_minutes": 60,
                "slot_type": "urgent"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["removed"], 2);
    assert_eq!(body["removed_booked"], 1);
    assert_eq!(body["inserted"], 1);
}

#[tokio::test]
async fn requests_without_bearer_token_are_rejected() {
    let (app, _store) = test_app();
    let actor = Actor {
        id: Uuid::new_v4(),
        role: Role::Doctor,
    };

    let request = axum::http::Request::builder()
        .method("GET")
        .uri(format!("/doctors/{}/dates/2026-09-21/available", actor.id))
        .body(axum::body::Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
