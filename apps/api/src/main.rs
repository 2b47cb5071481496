use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{self, TraceLayer};
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;
mod seed;

use appointment_cell::{
    InMemoryAppointmentStore, NotificationClient, NotificationDispatcher, SchedulingCoordinator,
};
use auth_cell::UserDirectory;
use doctor_cell::DoctorRegistry;
use patient_cell::PatientRegistry;
use shared_config::AppConfig;
use shared_utils::clock::SystemClock;
use shared_utils::session::SessionService;

use crate::router::AppState;

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

    info!("Starting clinic back-office API server");

    // Load configuration
    let config = AppConfig::from_env();

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Wire up shared services
    let clock = Arc::new(SystemClock);
    let sessions = Arc::new(SessionService::new(&config, clock.clone()));
    let users = Arc::new(UserDirectory::new());
    let patients = Arc::new(PatientRegistry::new());
    let doctors = Arc::new(DoctorRegistry::new());
    let store = InMemoryAppointmentStore::shared();

    let notifier = NotificationDispatcher::spawn(
        NotificationClient::new(&config.notifier_base_url),
        config.notification_queue_size,
    );

    let coordinator = Arc::new(SchedulingCoordinator::new(
        store,
        patients.clone(),
        doctors.clone(),
        notifier,
        clock,
        Duration::from_millis(config.doctor_lock_wait_ms),
    ));

    seed::seed_demo_data(&users, &doctors).await;

    let state = AppState {
        sessions,
        users,
        patients,
        doctors,
        coordinator,
    };

    // Build the application router
    let app = router::create_router(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors);

    // Run the server
    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
