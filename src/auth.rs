//! Authentication: peppered password hashing, JWT issuance/verification,
//! one-time backup codes and the Bearer-token middleware.
//!
//! The pepper is a server-side secret distinct from the per-record salt:
//! passwords are HMAC-SHA256'd with the pepper first, then hashed with
//! Argon2 (which supplies the salt). A leaked database alone is therefore
//! not enough to brute-force passwords offline.

use anyhow::{anyhow, Result};
use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher as _, PasswordVerifier};
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use hmac::{Hmac, Mac};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::errors::AppError;
use crate::handlers::state::AppState;

type HmacSha256 = Hmac<Sha256>;

/// Authenticated user injected into the request extensions by the middleware.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
}

/// JWT claims
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: i64,
    pub username: String,
    pub iat: u64,
    pub exp: u64,
}

/// Password hashing with a server-side pepper.
#[derive(Clone)]
pub struct PasswordHasher {
    pepper: String,
}

impl PasswordHasher {
    pub fn new(pepper: impl Into<String>) -> Self {
        Self {
            pepper: pepper.into(),
        }
    }

    /// HMAC-SHA256 the secret under the pepper, hex-encoded.
    fn peppered(&self, secret: &str) -> Result<String> {
        let mut mac = HmacSha256::new_from_slice(self.pepper.as_bytes())
            .map_err(|e| anyhow!("invalid pepper key: {e}"))?;
        mac.update(secret.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Hash a password (or backup code) into a PHC string.
    pub fn hash(&self, secret: &str) -> Result<String> {
        let peppered = self.peppered(secret)?;
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(peppered.as_bytes(), &salt)
            .map_err(|e| anyhow!("password hashing failed: {e}"))?;
        Ok(hash.to_string())
    }

    /// Verify a password (or backup code) against a stored PHC string.
    pub fn verify(&self, secret: &str, stored_hash: &str) -> Result<bool> {
        let peppered = self.peppered(secret)?;
        let parsed =
            PasswordHash::new(stored_hash).map_err(|e| anyhow!("corrupt stored hash: {e}"))?;
        Ok(Argon2::default()
            .verify_password(peppered.as_bytes(), &parsed)
            .is_ok())
    }
}

/// JWT signing/verification keys plus token lifetime.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: u64,
}

impl TokenKeys {
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    /// Issue a token for the given user.
    pub fn issue(&self, user_id: i64, username: &str) -> Result<String> {
        let now = chrono::Utc::now().timestamp() as u64;
        let claims = Claims {
            sub: user_id,
            username: username.to_string(),
            iat: now,
            exp: now + self.ttl_secs,
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| anyhow!("token signing failed: {e}"))
    }

    /// Verify a token and return its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::InvalidToken("token expired".to_string())
                }
                _ => AppError::InvalidToken("signature verification failed".to_string()),
            })
    }
}

/// Generate plaintext backup codes in `XXXX-XXXX` form.
///
/// Returned exactly once to the caller; only hashes are stored.
pub fn generate_backup_codes(count: usize) -> Vec<String> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| {
            let raw: String = (&mut rng)
                .sample_iter(&Alphanumeric)
                .take(8)
                .map(char::from)
                .collect();
            let raw = raw.to_uppercase();
            format!("{}-{}", &raw[..4], &raw[4..])
        })
        .collect()
}

/// Authentication middleware for protected routes.
///
/// Extracts `Authorization: Bearer <JWT>`, verifies it, and injects
/// [`AuthUser`] into the request extensions. Missing or invalid tokens
/// yield 401 without reaching the handler.
pub async fn require_auth(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let token = match request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|s| s.to_string())
    {
        Some(token) => token,
        None => return AppError::MissingToken.into_response(),
    };

    match state.token_keys.verify(&token) {
        Ok(claims) => {
            request.extensions_mut().insert(AuthUser {
                id: claims.sub,
                username: claims.username,
            });
            next.run(request).await
        }
        Err(err) => err.into_response(),
    }
}
