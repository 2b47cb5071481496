use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use shared_models::error::AppError;

use crate::session::SessionService;

/// Middleware for authentication. Rejects missing, malformed, expired and
/// revoked bearer tokens before the handler runs.
pub async fn auth_middleware(
    State(sessions): State<Arc<SessionService>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .ok_or_else(|| AppError::Auth("Missing authorization header".to_string()))?;

    let auth_value = auth_header
        .to_str()
        .map_err(|_| AppError::Auth("Invalid authorization header format".to_string()))?;

    if !auth_value.starts_with("Bearer ") {
        return Err(AppError::Auth("Invalid authorization header format".to_string()));
    }

    let token = &auth_value[7..];

    let user = sessions.validate(token)?;

    // Make the caller's identity available to handlers
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}
