use std::net::SocketAddr;
use std::sync::Arc;

use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{self, TraceLayer};
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use appointment_cell::router::AppointmentState;
use appointment_cell::services::booking::BookingCoordinator;
use appointment_cell::services::lifecycle::{AppointmentLifecycleService, ReminderCancellation};
use directory_cell::router::DirectoryState;
use directory_cell::services::directory::DirectoryService;
use directory_cell::services::tokens::InMemoryTokenRegistry;
use notification_cell::{
    jobs, DispatcherSettings, NotificationDispatcher, PushClient, ReminderScheduler,
    ReminderSettings, RetentionCleaner, RetentionSettings,
};
use schedule_cell::router::ScheduleState;
use schedule_cell::services::availability::AvailabilityService;
use shared_config::AppConfig;
use shared_models::external::{
    Clock, Directory, PushGateway, PushTokenRegistry, SystemClock,
};
use shared_models::policy::PolicyEngine;
use shared_store::SchedulingStore;

#[tokio::main]
async fn main() {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting clinic scheduling API server");

    // Load configuration
    let config = Arc::new(AppConfig::from_env());

    // Shared storage and collaborators
    let store = Arc::new(SchedulingStore::new());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let directory = Arc::new(DirectoryService::new());
    let tokens = Arc::new(InMemoryTokenRegistry::new());
    let gateway: Arc<dyn PushGateway> = Arc::new(PushClient::new(&config));
    let policy = PolicyEngine::new();

    // Notification pipeline
    let reminders = Arc::new(ReminderScheduler::new(
        Arc::clone(&store),
        Arc::clone(&tokens) as Arc<dyn PushTokenRegistry>,
        Arc::clone(&gateway),
        Arc::clone(&clock),
        ReminderSettings::from_config(&config),
    ));
    let dispatcher = Arc::new(NotificationDispatcher::new(
        Arc::clone(&store),
        Arc::clone(&tokens) as Arc<dyn PushTokenRegistry>,
        Arc::clone(&gateway),
        Arc::clone(&reminders),
        Arc::clone(&clock),
        DispatcherSettings::from_config(&config),
    ));
    let retention = Arc::new(RetentionCleaner::new(
        Arc::clone(&store),
        Arc::clone(&clock),
        RetentionSettings::from_config(&config),
    ));

    // Cell services
    let availability = Arc::new(AvailabilityService::new(Arc::clone(&store)));
    let booking = Arc::new(BookingCoordinator::new(
        Arc::clone(&store),
        Arc::clone(&directory) as Arc<dyn Directory>,
        Arc::clone(&clock),
    ));
    let lifecycle = Arc::new(AppointmentLifecycleService::new(
        Arc::clone(&store),
        Arc::clone(&clock),
        Arc::clone(&reminders) as Arc<dyn ReminderCancellation>,
    ));

    // Background jobs
    tokio::spawn(jobs::run_dispatcher(
        Arc::clone(&dispatcher),
        Arc::clone(&store),
        Arc::clone(&config),
    ));
    tokio::spawn(jobs::run_reminder_timer(
        Arc::clone(&reminders),
        Arc::clone(&config),
    ));
    tokio::spawn(jobs::run_retention_timer(retention, Arc::clone(&config)));

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the application router
    let app = router::create_router(
        ScheduleState {
            availability,
            policy,
        },
        AppointmentState {
            booking,
            lifecycle,
            policy,
        },
        DirectoryState {
            directory,
            tokens,
            policy,
        },
    )
    .layer(
        TraceLayer::new_for_http()
            .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
            .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
    )
    .layer(cors);

    // Run the server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.bind_port));
    info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
