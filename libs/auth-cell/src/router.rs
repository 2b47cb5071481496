use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::AuthState;

pub fn auth_routes(state: AuthState) -> Router {
    Router::new()
        .route("/login", post(handlers::login))
        .route("/logout", post(handlers::logout))
        .route("/validate", get(handlers::validate_token))
        .with_state(state)
}
