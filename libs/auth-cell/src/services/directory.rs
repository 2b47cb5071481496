use std::collections::HashMap;

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use tokio::sync::RwLock;
use tracing::{debug, info};

use shared_models::auth::AuthUser;
use shared_models::error::AppError;

#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid username or password")]
    BadCredentials,

    #[error("Account is disabled")]
    Disabled,

    #[error("Credential storage error: {0}")]
    CredentialStorage(String),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::BadCredentials | AuthError::Disabled => AppError::Auth(err.to_string()),
            AuthError::CredentialStorage(msg) => AppError::Internal(msg),
        }
    }
}

struct UserRecord {
    username: String,
    password_hash: String,
    role: String,
    enabled: bool,
}

/// In-memory credential store. Passwords are kept as Argon2 hashes and
/// verification yields `{username, role}` for the token issuer.
pub struct UserDirectory {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
        }
    }

    pub async fn add_user(
        &self,
        username: &str,
        password: &str,
        role: &str,
        enabled: bool,
    ) -> Result<(), AuthError> {
        let password_hash = Self::hash_password(password)
            .map_err(|e| AuthError::CredentialStorage(e.to_string()))?;

        let record = UserRecord {
            username: username.to_string(),
            password_hash,
            role: role.to_string(),
            enabled,
        };

        self.users.write().await.insert(record.username.clone(), record);
        info!("User {} added to directory", username);
        Ok(())
    }

    pub async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthUser, AuthError> {
        let users = self.users.read().await;

        let record = match users.get(username) {
            Some(record) => record,
            None => {
                debug!("Login attempt for unknown user {}", username);
                return Err(AuthError::BadCredentials);
            }
        };

        if !Self::verify_password(password, &record.password_hash)
            .map_err(|e| AuthError::CredentialStorage(e.to_string()))?
        {
            debug!("Password mismatch for user {}", username);
            return Err(AuthError::BadCredentials);
        }

        if !record.enabled {
            return Err(AuthError::Disabled);
        }

        Ok(AuthUser {
            username: record.username.clone(),
            role: record.role.clone(),
        })
    }

    fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let password_hash = argon2.hash_password(password.as_bytes(), &salt)?;
        Ok(password_hash.to_string())
    }

    fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
        let parsed_hash = PasswordHash::new(hash)?;
        let argon2 = Argon2::default();

        match argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

impl Default for UserDirectory {
    fn default() -> Self {
        Self::new()
    }
}
