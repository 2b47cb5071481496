use std::sync::Arc;

use assert_matches::assert_matches;
use axum::extract::{Json, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum_extra::TypedHeader;
use chrono::{Duration, TimeZone, Utc};
use headers::Authorization;

use auth_cell::handlers::{login, logout, validate_token};
use auth_cell::{AuthState, UserDirectory};
use shared_models::auth::LoginRequest;
use shared_models::error::AppError;
use shared_utils::clock::ManualClock;
use shared_utils::session::SessionService;
use shared_utils::test_utils::TestConfig;

async fn test_state() -> (AuthState, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::at(
        Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap(),
    ));
    let sessions = Arc::new(SessionService::new(
        &TestConfig::default().to_app_config(),
        clock.clone(),
    ));

    let users = Arc::new(UserDirectory::new());
    users.add_user("admin", "admin123", "ADMIN", true).await.unwrap();
    users
        .add_user("receptionist", "recep123", "RECEPTIONIST", true)
        .await
        .unwrap();
    users
        .add_user("locked", "locked123", "RECEPTIONIST", false)
        .await
        .unwrap();

    (AuthState { sessions, users }, clock)
}

fn login_request(username: &str, password: &str) -> LoginRequest {
    LoginRequest {
        username: username.to_string(),
        password: password.to_string(),
    }
}

fn bearer_headers(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        "authorization",
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );
    headers
}

#[tokio::test]
async fn login_returns_bearer_token_with_role() {
    let (state, _clock) = test_state().await;

    let response = login(State(state.clone()), Json(login_request("admin", "admin123")))
        .await
        .unwrap()
        .0;

    assert_eq!(response.token_type, "Bearer");
    assert_eq!(response.username, "admin");
    assert_eq!(response.role, "ADMIN");
    assert_eq!(response.expires_in, 3600);

    let user = state.sessions.validate(&response.access_token).unwrap();
    assert_eq!(user.username, "admin");
    assert_eq!(user.role, "ADMIN");
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() {
    let (state, _clock) = test_state().await;

    let result = login(State(state), Json(login_request("admin", "nope"))).await;

    assert_matches!(result, Err(AppError::Auth(_)));
}

#[tokio::test]
async fn login_with_unknown_user_is_unauthorized() {
    let (state, _clock) = test_state().await;

    let result = login(State(state), Json(login_request("ghost", "admin123"))).await;

    assert_matches!(result, Err(AppError::Auth(_)));
}

#[tokio::test]
async fn login_with_disabled_account_is_unauthorized() {
    let (state, _clock) = test_state().await;

    let result = login(State(state), Json(login_request("locked", "locked123"))).await;

    assert_matches!(result, Err(AppError::Auth(_)));
}

#[tokio::test]
async fn logout_revokes_the_presented_token() {
    let (state, _clock) = test_state().await;

    let response = login(
        State(state.clone()),
        Json(login_request("receptionist", "recep123")),
    )
    .await
    .unwrap()
    .0;

    let headers = bearer_headers(&response.access_token);
    assert!(validate_token(State(state.clone()), headers.clone()).await.is_ok());

    let auth = Authorization::bearer(&response.access_token).unwrap();
    let status = logout(State(state.clone()), TypedHeader(auth)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let result = validate_token(State(state), headers).await;
    assert_matches!(result, Err(AppError::Auth(msg)) if msg.contains("revoked"));
}

#[tokio::test]
async fn validate_rejects_expired_token_independent_of_revocation() {
    let (state, clock) = test_state().await;

    let response = login(State(state.clone()), Json(login_request("admin", "admin123")))
        .await
        .unwrap()
        .0;

    clock.advance(Duration::minutes(61));

    let result = validate_token(State(state), bearer_headers(&response.access_token)).await;
    assert_matches!(result, Err(AppError::Auth(msg)) if msg.contains("expired"));
}

#[tokio::test]
async fn validate_rejects_missing_and_malformed_headers() {
    let (state, _clock) = test_state().await;

    let result = validate_token(State(state.clone()), HeaderMap::new()).await;
    assert_matches!(result, Err(AppError::Auth(msg)) if msg == "Missing authorization header");

    let mut headers = HeaderMap::new();
    headers.insert("authorization", HeaderValue::from_static("sometoken"));
    let result = validate_token(State(state), headers).await;
    assert_matches!(result, Err(AppError::Auth(msg)) if msg == "Invalid authorization header format");
}
