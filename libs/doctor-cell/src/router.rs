use std::sync::Arc;

use axum::{
    middleware,
    routing::get,
    Router,
};

use shared_utils::extractor::auth_middleware;
use shared_utils::session::SessionService;

use crate::handlers;
use crate::services::doctor::DoctorRegistry;

pub fn doctor_routes(registry: Arc<DoctorRegistry>, sessions: Arc<SessionService>) -> Router {
    Router::new()
        .route("/", get(handlers::list_doctors))
        .route("/search", get(handlers::search_doctors))
        .route("/specialty/{specialty}", get(handlers::get_doctors_by_specialty))
        .route("/{doctor_id}", get(handlers::get_doctor))
        .layer(middleware::from_fn_with_state(sessions, auth_middleware))
        .with_state(registry)
}
