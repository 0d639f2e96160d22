use axum::{routing::get, Router};

use appointment_cell::router::{appointment_routes, AppointmentState};
use directory_cell::router::{directory_routes, DirectoryState};
use schedule_cell::router::{schedule_routes, ScheduleState};

pub fn create_router(
    schedules: ScheduleState,
    appointments: AppointmentState,
    directory: DirectoryState,
) -> Router {
    Router::new()
        .route("/", get(|| async { "Clinic scheduling API is running!" }))
        .nest("/schedules", schedule_routes(schedules))
        .nest("/appointments", appointment_routes(appointments))
        .nest("/directory", directory_routes(directory))
}
