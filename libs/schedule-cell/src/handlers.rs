// libs/schedule-cell/src/handlers.rs
use axum::{
    extract::{Extension, Path, State},
    Json,
};
use chrono::NaiveDate;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::auth::Actor;
use shared_models::error::AppError;
use shared_models::policy::{Action, Resource};
use shared_store::StoreError;

use crate::models::{CreateScheduleRequest, ReplaceRangeRequest, ReplaceRangeResponse, ScheduleError};
use crate::router::ScheduleState;

pub async fn create_schedule(
    State(state): State<ScheduleState>,
    Extension(actor): Extension<Actor>,
    Path((doctor_id, date)): Path<(Uuid, NaiveDate)>,
    Json(request): Json<CreateScheduleRequest>,
) -> Result<Json<Value>, AppError> {
    state.policy.authorize(
        &actor,
        Action::ManageSchedule,
        &Resource::DoctorSchedule { doctor_id },
    )?;

    let created = state
        .availability
        .create_schedule(doctor_id, date, request)
        .await
        .map_err(map_schedule_error)?;

    Ok(Json(json!({
        "doctor_id": doctor_id,
        "date": date,
        "slots": created.slots,
        "removed_booked": created.removed_booked,
    })))
}

pub async fn list_available_slots(
    State(state): State<ScheduleState>,
    Extension(_actor): Extension<Actor>,
    Path((doctor_id, date)): Path<(Uuid, NaiveDate)>,
) -> Result<Json<Value>, AppError> {
    let slots = state.availability.list_available(doctor_id, date).await;

    Ok(Json(json!({
        "doctor_id": doctor_id,
        "date": date,
        "slots": slots,
    })))
}

pub async fn replace_range(
    State(state): State<ScheduleState>,
    Extension(actor): Extension<Actor>,
    Path((doctor_id, date)): Path<(Uuid, NaiveDate)>,
    Json(request): Json<ReplaceRangeRequest>,
) -> Result<Json<ReplaceRangeResponse>, AppError> {
    state.policy.authorize(
        &actor,
        Action::ManageSchedule,
        &Resource::DoctorSchedule { doctor_id },
    )?;

    let outcome = state
        .availability
        .replace_range(doctor_id, date, request)
        .await
        .map_err(map_schedule_error)?;

    Ok(Json(ReplaceRangeResponse {
        removed: outcome.removed,
        removed_booked: outcome.removed_claimed,
        inserted: outcome.inserted,
    }))
}

fn map_schedule_error(e: ScheduleError) -> AppError {
    match e {
        ScheduleError::Validation(msg) => AppError::BadRequest(msg),
        ScheduleError::Store(StoreError::OverlappingSlots) => {
            AppError::BadRequest("Replacement slots overlap existing slots".to_string())
        }
        ScheduleError::Store(err) => AppError::Internal(err.to_string()),
    }
}
