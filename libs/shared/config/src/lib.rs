use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jwt_secret: String,
    pub token_lifetime_minutes: i64,
    pub revocation_cache_capacity: usize,
    pub doctor_lock_wait_ms: u64,
    pub notifier_base_url: String,
    pub notification_queue_size: usize,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            jwt_secret: env::var("CLINIC_JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("CLINIC_JWT_SECRET not set, using empty value");
                    String::new()
                }),
            token_lifetime_minutes: env::var("CLINIC_TOKEN_LIFETIME_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            revocation_cache_capacity: env::var("CLINIC_REVOCATION_CACHE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10_000),
            doctor_lock_wait_ms: env::var("CLINIC_DOCTOR_LOCK_WAIT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5_000),
            notifier_base_url: env::var("CLINIC_NOTIFIER_BASE_URL")
                .unwrap_or_else(|_| {
                    warn!("CLINIC_NOTIFIER_BASE_URL not set, confirmations will fail and be dropped");
                    String::new()
                }),
            notification_queue_size: env::var("CLINIC_NOTIFICATION_QUEUE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(256),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.jwt_secret.is_empty()
    }
}
