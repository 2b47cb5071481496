use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

use shared_utils::extractor::auth_middleware;
use shared_utils::session::SessionService;

use crate::handlers;
use crate::services::patient::PatientRegistry;

pub fn patient_routes(registry: Arc<PatientRegistry>, sessions: Arc<SessionService>) -> Router {
    Router::new()
        .route("/", post(handlers::register_patient))
        .route("/", get(handlers::list_patients))
        .route("/{patient_id}", get(handlers::get_patient))
        .route("/{patient_id}", delete(handlers::delete_patient))
        .layer(middleware::from_fn_with_state(sessions, auth_middleware))
        .with_state(registry)
}
