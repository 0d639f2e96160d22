// libs/schedule-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, patch, put},
    Router,
};

use shared_models::policy::PolicyEngine;
use shared_utils::extractor::actor_middleware;

use crate::handlers;
use crate::services::availability::AvailabilityService;

#[derive(Clone)]
pub struct ScheduleState {
    pub availability: Arc<AvailabilityService>,
    pub policy: PolicyEngine,
}

pub fn schedule_routes(state: ScheduleState) -> Router {
    Router::new()
        .route("/doctors/{doctor_id}/dates/{date}", put(handlers::create_schedule))
        .route(
            "/doctors/{doctor_id}/dates/{date}/available",
            get(handlers::list_available_slots),
        )
        .route(
            "/doctors/{doctor_id}/dates/{date}/range",
            patch(handlers::replace_range),
        )
        .layer(middleware::from_fn(actor_middleware))
        .with_state(state)
}
