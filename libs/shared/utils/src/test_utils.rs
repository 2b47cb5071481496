use chrono::{Duration, Utc};

use shared_config::AppConfig;
use shared_models::auth::JwtClaims;

use crate::jwt::encode_token;

pub struct TestConfig {
    pub jwt_secret: String,
    pub token_lifetime_minutes: i64,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            token_lifetime_minutes: 60,
        }
    }
}

impl TestConfig {
    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            jwt_secret: self.jwt_secret.clone(),
            token_lifetime_minutes: self.token_lifetime_minutes,
            revocation_cache_capacity: 10_000,
            doctor_lock_wait_ms: 5_000,
            notifier_base_url: "http://localhost:59999".to_string(),
            notification_queue_size: 16,
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(
        username: &str,
        role: &str,
        secret: &str,
        exp_hours: Option<i64>,
    ) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let claims = JwtClaims {
            sub: username.to_string(),
            role: Some(role.to_string()),
            iat: Some(now.timestamp()),
            exp: Some(exp.timestamp()),
        };

        encode_token(&claims, secret)
    }

    pub fn create_expired_token(username: &str, role: &str, secret: &str) -> String {
        Self::create_test_token(username, role, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(username: &str, role: &str) -> String {
        Self::create_test_token(username, role, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}
