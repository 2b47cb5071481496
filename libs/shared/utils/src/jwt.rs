use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::{Digest, Sha256};
use tracing::debug;

use shared_models::auth::{JwtClaims, TokenError};

type HmacSha256 = Hmac<Sha256>;

/// Build a signed `header.claims.signature` token.
pub fn encode_token(claims: &JwtClaims, jwt_secret: &str) -> String {
    let header = json!({
        "alg": "HS256",
        "typ": "JWT"
    });

    let payload = json!({
        "sub": claims.sub,
        "role": claims.role,
        "iat": claims.iat,
        "exp": claims.exp
    });

    let header_encoded = URL_SAFE_NO_PAD.encode(header.to_string());
    let payload_encoded = URL_SAFE_NO_PAD.encode(payload.to_string());

    let signing_input = format!("{}.{}", header_encoded, payload_encoded);

    let mut mac = HmacSha256::new_from_slice(jwt_secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(signing_input.as_bytes());
    let signature = mac.finalize().into_bytes();
    let signature_encoded = URL_SAFE_NO_PAD.encode(signature);

    format!("{}.{}", signing_input, signature_encoded)
}

/// Verify signature and expiry and hand back the claims. Revocation is not
/// checked here; the session layer probes its cache only after this passes.
pub fn decode_token(
    token: &str,
    jwt_secret: &str,
    now: DateTime<Utc>,
) -> Result<JwtClaims, TokenError> {
    if jwt_secret.is_empty() {
        return Err(TokenError::Invalid("JWT secret is not set".to_string()));
    }

    // Split token into parts
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(TokenError::Invalid("Invalid token format".to_string()));
    }

    let header_b64 = parts[0];
    let claims_b64 = parts[1];
    let signature_b64 = parts[2];

    let signature = match URL_SAFE_NO_PAD.decode(signature_b64) {
        Ok(sig) => sig,
        Err(e) => {
            debug!("Failed to decode signature: {}", e);
            return Err(TokenError::Invalid("Invalid signature encoding".to_string()));
        }
    };

    let signing_input = format!("{}.{}", header_b64, claims_b64);

    let mut mac = match HmacSha256::new_from_slice(jwt_secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => return Err(TokenError::Invalid("Failed to create HMAC".to_string())),
    };

    mac.update(signing_input.as_bytes());

    if mac.verify_slice(&signature).is_err() {
        debug!("Token signature verification failed");
        return Err(TokenError::Invalid("Invalid token signature".to_string()));
    }

    // Decode claims
    let claims_json = match URL_SAFE_NO_PAD.decode(claims_b64) {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(json_str) => json_str,
            Err(_) => return Err(TokenError::Invalid("Invalid claims encoding".to_string())),
        },
        Err(_) => return Err(TokenError::Invalid("Invalid claims encoding".to_string())),
    };

    let claims: JwtClaims = match serde_json::from_str(&claims_json) {
        Ok(c) => c,
        Err(e) => {
            debug!("Failed to parse claims: {}", e);
            return Err(TokenError::Invalid("Invalid claims format".to_string()));
        }
    };

    // Check expiration
    if let Some(exp) = claims.exp {
        if now.timestamp() >= exp {
            debug!("Token expired at {} (now: {})", exp, now.timestamp());
            return Err(TokenError::Expired);
        }
    }

    Ok(claims)
}

/// Stable identifier of a token for revocation purposes. Hashing the whole
/// signed string avoids a server-side per-token id space and keeps cache
/// keys fixed-size.
pub fn token_digest(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}
