// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_models::policy::PolicyEngine;
use shared_utils::extractor::actor_middleware;

use crate::handlers;
use crate::services::booking::BookingCoordinator;
use crate::services::lifecycle::AppointmentLifecycleService;

#[derive(Clone)]
pub struct AppointmentState {
    pub booking: Arc<BookingCoordinator>,
    pub lifecycle: Arc<AppointmentLifecycleService>,
    pub policy: PolicyEngine,
}

pub fn appointment_routes(state: AppointmentState) -> Router {
    Router::new()
        .route("/", post(handlers::book_appointment))
        .route("/{appointment_id}", get(handlers::get_appointment))
        .route("/{appointment_id}/status", post(handlers::transition_appointment))
        .layer(middleware::from_fn(actor_middleware))
        .with_state(state)
}
