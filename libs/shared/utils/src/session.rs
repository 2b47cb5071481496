use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_models::auth::{AuthUser, JwtClaims, TokenError};

use crate::clock::Clock;
use crate::jwt::{decode_token, encode_token, token_digest};
use crate::revocation::RevocationCache;

pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues, validates and revokes the self-describing session tokens.
///
/// Validation order is fixed: signature and shape, then expiry, then the
/// revocation cache - an already-invalid token never costs a cache probe.
pub struct SessionService {
    jwt_secret: String,
    token_lifetime: Duration,
    clock: Arc<dyn Clock>,
    revoked: RevocationCache,
}

impl SessionService {
    pub fn new(config: &AppConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            jwt_secret: config.jwt_secret.clone(),
            token_lifetime: Duration::minutes(config.token_lifetime_minutes),
            clock,
            revoked: RevocationCache::new(config.revocation_cache_capacity),
        }
    }

    pub fn token_lifetime(&self) -> Duration {
        self.token_lifetime
    }

    pub fn issue(&self, username: &str, role: &str) -> IssuedToken {
        let now = self.clock.now();
        let expires_at = now + self.token_lifetime;

        let claims = JwtClaims {
            sub: username.to_string(),
            role: Some(role.to_string()),
            iat: Some(now.timestamp()),
            exp: Some(expires_at.timestamp()),
        };

        debug!("Issued session token for {} expiring at {}", username, expires_at);

        IssuedToken {
            token: encode_token(&claims, &self.jwt_secret),
            expires_at,
        }
    }

    pub fn validate(&self, token: &str) -> Result<AuthUser, TokenError> {
        self.introspect(token).map(|(user, _)| user)
    }

    pub fn introspect(
        &self,
        token: &str,
    ) -> Result<(AuthUser, Option<DateTime<Utc>>), TokenError> {
        let now = self.clock.now();
        let claims = decode_token(token, &self.jwt_secret, now)?;

        if self.revoked.contains(&token_digest(token), now) {
            debug!("Rejected revoked token for {}", claims.sub);
            return Err(TokenError::Revoked);
        }

        let expires_at = claims
            .exp
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single());

        let user = AuthUser {
            username: claims.sub,
            role: claims.role.unwrap_or_default(),
        };

        Ok((user, expires_at))
    }

    /// Blacklist a token for the remainder of its own lifetime. Tokens that
    /// no longer validate have nothing left to revoke and are ignored.
    pub fn revoke(&self, token: &str) {
        let now = self.clock.now();

        match decode_token(token, &self.jwt_secret, now) {
            Ok(claims) => {
                let expires_at = claims
                    .exp
                    .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
                    .unwrap_or_else(|| now + self.token_lifetime);

                self.revoked.insert(token_digest(token), expires_at, now);
                info!("Session token for {} revoked", claims.sub);
            }
            Err(err) => {
                debug!("Ignoring revocation of unusable token: {}", err);
            }
        }
    }
}
