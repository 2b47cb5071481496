use axum::{
    extract::{Json, State},
    http::{HeaderMap, StatusCode},
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use tracing::{debug, info};

use shared_models::auth::{AuthResponse, LoginRequest, TokenResponse};
use shared_models::error::AppError;

use crate::AuthState;

// Helper function to extract token
fn extract_bearer_token(headers: &HeaderMap) -> Result<String, AppError> {
    let auth_header = headers
        .get("Authorization")
        .ok_or_else(|| AppError::Auth("Missing authorization header".to_string()))?;

    let auth_value = auth_header
        .to_str()
        .map_err(|_| AppError::Auth("Invalid authorization header format".to_string()))?;

    if !auth_value.starts_with("Bearer ") {
        return Err(AppError::Auth("Invalid authorization header format".to_string()));
    }

    Ok(auth_value[7..].to_string())
}

pub async fn login(
    State(state): State<AuthState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    info!("Login attempt for user: {}", request.username);

    let user = state
        .users
        .verify_credentials(&request.username, &request.password)
        .await?;

    let issued = state.sessions.issue(&user.username, &user.role);

    info!("Login successful for user: {}", user.username);

    Ok(Json(AuthResponse {
        access_token: issued.token,
        token_type: "Bearer".to_string(),
        expires_in: state.sessions.token_lifetime().num_seconds(),
        username: user.username,
        role: user.role,
    }))
}

/// Blacklists the presented token for the rest of its lifetime. Tokens that
/// no longer validate are ignored, so logout always succeeds.
pub async fn logout(
    State(state): State<AuthState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> StatusCode {
    state.sessions.revoke(auth.token());
    StatusCode::NO_CONTENT
}

pub async fn validate_token(
    State(state): State<AuthState>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>, AppError> {
    debug!("Validating token");

    let token = extract_bearer_token(&headers)?;
    let (user, expires_at) = state.sessions.introspect(&token)?;

    Ok(Json(TokenResponse {
        valid: true,
        username: user.username,
        role: user.role,
        expires_at,
    }))
}
