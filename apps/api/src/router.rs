use std::sync::Arc;

use axum::{routing::get, Router};

use appointment_cell::router::appointment_routes;
use appointment_cell::SchedulingCoordinator;
use auth_cell::router::auth_routes;
use auth_cell::{AuthState, UserDirectory};
use doctor_cell::router::doctor_routes;
use doctor_cell::DoctorRegistry;
use patient_cell::router::patient_routes;
use patient_cell::PatientRegistry;
use shared_utils::session::SessionService;

pub struct AppState {
    pub sessions: Arc<SessionService>,
    pub users: Arc<UserDirectory>,
    pub patients: Arc<PatientRegistry>,
    pub doctors: Arc<DoctorRegistry>,
    pub coordinator: Arc<SchedulingCoordinator>,
}

pub fn create_router(state: AppState) -> Router {
    let auth_state = AuthState {
        sessions: state.sessions.clone(),
        users: state.users.clone(),
    };

    Router::new()
        .route("/", get(|| async { "Clinic back-office API is running!" }))
        .nest("/auth", auth_routes(auth_state))
        .nest(
            "/patients",
            patient_routes(state.patients.clone(), state.sessions.clone()),
        )
        .nest(
            "/doctors",
            doctor_routes(state.doctors.clone(), state.sessions.clone()),
        )
        .nest(
            "/appointments",
            appointment_routes(state.coordinator.clone(), state.sessions.clone()),
        )
}
