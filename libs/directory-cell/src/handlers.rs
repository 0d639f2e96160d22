// libs/directory-cell/src/handlers.rs
use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::auth::Actor;
use shared_models::error::AppError;
use shared_models::external::{DoctorRecord, PatientRecord};
use shared_models::policy::{Action, Resource};

use crate::models::{RegisterTokenRequest, UpsertDoctorRequest, UpsertPatientRequest};
use crate::router::DirectoryState;

pub async fn upsert_doctor(
    State(state): State<DirectoryState>,
    Extension(actor): Extension<Actor>,
    Path(doctor_id): Path<Uuid>,
    Json(request): Json<UpsertDoctorRequest>,
) -> Result<Json<Value>, AppError> {
    state
        .policy
        .authorize(&actor, Action::ManageDirectory, &Resource::Directory)?;

    state
        .directory
        .upsert_doctor(DoctorRecord {
            id: doctor_id,
            name: request.name,
            address: request.address,
            specialization: request.specialization,
        })
        .await;

    Ok(Json(json!({ "id": doctor_id })))
}

pub async fn upsert_patient(
    State(state): State<DirectoryState>,
    Extension(actor): Extension<Actor>,
    Path(patient_id): Path<Uuid>,
    Json(request): Json<UpsertPatientRequest>,
) -> Result<Json<Value>, AppError> {
    state
        .policy
        .authorize(&actor, Action::ManageDirectory, &Resource::Directory)?;

    state
        .directory
        .upsert_patient(PatientRecord {
            id: patient_id,
            name: request.name,
        })
        .await;

    Ok(Json(json!({ "id": patient_id })))
}

pub async fn register_token(
    State(state): State<DirectoryState>,
    Extension(actor): Extension<Actor>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<RegisterTokenRequest>,
) -> Result<Json<Value>, AppError> {
    state
        .policy
        .authorize(&actor, Action::ManagePushToken, &Resource::PushToken { user_id })?;

    if request.token.trim().is_empty() {
        return Err(AppError::BadRequest("token must not be empty".to_string()));
    }

    state.tokens.register(user_id, request.token).await;
    Ok(Json(json!({ "user_id": user_id })))
}

pub async fn remove_token(
    State(state): State<DirectoryState>,
    Extension(actor): Extension<Actor>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    state
        .policy
        .authorize(&actor, Action::ManagePushToken, &Resource::PushToken { user_id })?;

    let removed = state.tokens.remove(user_id).await;
    Ok(Json(json!({ "user_id": user_id, "removed": removed })))
}
