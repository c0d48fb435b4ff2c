//! Access-token issuing and validation, and refresh-secret generation.
//!
//! Access tokens are HS256 JWTs with a strongly typed claims structure:
//! every required field is checked once at decode time and a missing or
//! mistyped claim fails deterministically. Keys live inside the issuer,
//! handed in through the constructor; there is no process-global key state.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::JwtSettings;
use crate::error::{AuthError, Result};

/// URL-safe alphabet for opaque refresh secrets (base64url character set).
const REFRESH_SECRET_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// 32 characters over a 64-symbol alphabet: 192 bits of entropy, so a
/// storage-time collision is a server fault, not an expected event.
const REFRESH_SECRET_LEN: usize = 32;

/// Access token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (user ID)
    pub sub: Uuid,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Not valid before (Unix timestamp)
    pub nbf: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Snapshot of the user's refresh_token_version at issuance
    pub rtv: i32,
    pub iss: String,
    pub aud: String,
}

/// Mints and validates signed access tokens.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
    access_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(settings: &JwtSettings) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&settings.issuer]);
        validation.set_audience(&[&settings.audience]);
        validation.validate_nbf = true;

        Self {
            encoding_key: EncodingKey::from_secret(settings.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(settings.secret.as_bytes()),
            validation,
            issuer: settings.issuer.clone(),
            audience: settings.audience.clone(),
            access_ttl: Duration::seconds(settings.access_ttl_secs),
        }
    }

    /// Generate a signed access token carrying the user's current token
    /// version snapshot.
    pub fn generate_access_token(&self, user_id: Uuid, version: i32) -> Result<String> {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: user_id,
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: (now + self.access_ttl).timestamp(),
            rtv: version,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Jwt(format!("Failed to sign access token: {}", e)))
    }

    /// Validate signature, expiry, nbf, issuer, and audience; decode the
    /// claims. All rejection classes (malformed, bad signature, expired)
    /// fold into the same generic authentication failure.
    pub fn validate_access_token(&self, token: &str) -> Result<AccessClaims> {
        let data = decode::<AccessClaims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}

/// Generate an opaque refresh-token secret.
///
/// 32 characters drawn from a URL-safe alphabet via the thread-local
/// CSPRNG. Uniqueness is enforced by the store's unique constraint; the
/// caller regenerates on conflict rather than retrying the same value.
pub fn generate_refresh_secret() -> String {
    let mut rng = rand::thread_rng();
    (0..REFRESH_SECRET_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..REFRESH_SECRET_ALPHABET.len());
            REFRESH_SECRET_ALPHABET[idx] as char
        })
        .collect()
}
