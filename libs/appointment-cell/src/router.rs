use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use shared_utils::extractor::auth_middleware;
use shared_utils::session::SessionService;

use crate::handlers;
use crate::services::scheduling::SchedulingCoordinator;

pub fn appointment_routes(
    coordinator: Arc<SchedulingCoordinator>,
    sessions: Arc<SessionService>,
) -> Router {
    // All appointment operations require authentication
    Router::new()
        .route("/", post(handlers::schedule_appointment))
        .route("/{appointment_id}", get(handlers::get_appointment))
        .route("/{appointment_id}", put(handlers::update_appointment))
        .route("/patients/{patient_id}", get(handlers::get_patient_appointments))
        .route("/doctors/{doctor_id}", get(handlers::get_doctor_appointments))
        .route("/conflicts/check", get(handlers::check_appointment_conflicts))
        .layer(middleware::from_fn_with_state(sessions, auth_middleware))
        .with_state(coordinator)
}
