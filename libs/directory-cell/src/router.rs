// libs/directory-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, put},
    Router,
};

use shared_models::policy::PolicyEngine;
use shared_utils::extractor::actor_middleware;

use crate::handlers;
use crate::services::directory::DirectoryService;
use crate::services::tokens::InMemoryTokenRegistry;

#[derive(Clone)]
pub struct DirectoryState {
    pub directory: Arc<DirectoryService>,
    pub tokens: Arc<InMemoryTokenRegistry>,
    pub policy: PolicyEngine,
}

pub fn directory_routes(state: DirectoryState) -> Router {
    Router::new()
        .route("/doctors/{doctor_id}", put(handlers::upsert_doctor))
        .route("/patients/{patient_id}", put(handlers::upsert_patient))
        .route("/tokens/{user_id}", put(handlers::register_token))
        .route("/tokens/{user_id}", delete(handlers::remove_token))
        .layer(middleware::from_fn(actor_middleware))
        .with_state(state)
}
