// libs/appointment-cell/src/handlers.rs
use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::appointment::Appointment;
use shared_models::auth::Actor;
use shared_models::error::AppError;
use shared_models::policy::{Action, Resource};

use crate::models::{AppointmentError, BookSlotRequest, TransitionRequest};
use crate::router::AppointmentState;

pub async fn book_appointment(
    State(state): State<AppointmentState>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<BookSlotRequest>,
) -> Result<Json<Appointment>, AppError> {
    state.policy.authorize(
        &actor,
        Action::BookAppointment,
        &Resource::Booking {
            patient_id: request.patient_id,
        },
    )?;

    let appointment = state
        .booking
        .book(request)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(appointment))
}

pub async fn get_appointment(
    State(state): State<AppointmentState>,
    Extension(_actor): Extension<Actor>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Appointment>, AppError> {
    let appointment = state
        .booking
        .get_appointment(appointment_id)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(appointment))
}

pub async fn transition_appointment(
    State(state): State<AppointmentState>,
    Extension(actor): Extension<Actor>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<TransitionRequest>,
) -> Result<Json<Value>, AppError> {
    let current = state
        .booking
        .get_appointment(appointment_id)
        .await
        .map_err(map_appointment_error)?;
    state.policy.authorize(
        &actor,
        Action::TransitionAppointment,
        &Resource::Appointment {
            doctor_id: current.doctor_id,
        },
    )?;

    let appointment = state
        .lifecycle
        .transition(appointment_id, request.new_status)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "appointment": appointment,
        "previous_status": current.status,
    })))
}

fn map_appointment_error(e: AppointmentError) -> AppError {
    match e {
        AppointmentError::NotFound => AppError::NotFound("Appointment not found".to_string()),
        AppointmentError::DoctorNotFound => AppError::NotFound("Doctor not found".to_string()),
        AppointmentError::PatientNotFound => AppError::NotFound("Patient not found".to_string()),
        AppointmentError::SlotNotFound => {
            AppError::NotFound("No slot starts at the requested time".to_string())
        }
        AppointmentError::SlotUnavailable => {
            AppError::Conflict("Slot no longer available, please pick another time".to_string())
        }
        AppointmentError::InvalidTransition { from, to } => {
            AppError::Conflict(format!("Cannot transition appointment from {} to {}", from, to))
        }
        AppointmentError::Validation(msg) => AppError::BadRequest(msg),
        AppointmentError::ExternalService(msg) => AppError::ExternalService(msg),
        AppointmentError::DatabaseError(msg) => AppError::Internal(msg),
    }
}
