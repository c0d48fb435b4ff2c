//! Session lifecycle orchestration.
//!
//! `SessionService` composes the credential verifier, the token issuer,
//! and the storage contracts into the login / refresh / validate /
//! revoke-all flows. Refresh-token rotation grants exactly one successful
//! renewal per secret: the decisive step is the store's conditional
//! revoke, not an application-level read-then-write.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::config::JwtSettings;
use crate::error::{AuthError, Result};
use crate::models::{
    AuthContext, AuthInfo, LoginRequest, NewRefreshToken, NewUser, RegisterRequest, User,
    UserWithAuth,
};
use crate::security::password::{self, DUMMY_HASH};
use crate::security::token::{generate_refresh_secret, TokenIssuer};
use crate::store::{RefreshTokenStore, UserStore};

/// Attempts at minting a refresh secret before treating repeated
/// uniqueness conflicts as an internal fault.
const MAX_SECRET_ATTEMPTS: usize = 3;

pub struct SessionService {
    users: Arc<dyn UserStore>,
    refresh_tokens: Arc<dyn RefreshTokenStore>,
    tokens: TokenIssuer,
    refresh_ttl: Duration,
}

impl SessionService {
    pub fn new(
        users: Arc<dyn UserStore>,
        refresh_tokens: Arc<dyn RefreshTokenStore>,
        jwt: &JwtSettings,
    ) -> Self {
        Self {
            users,
            refresh_tokens,
            tokens: TokenIssuer::new(jwt),
            refresh_ttl: Duration::seconds(jwt.refresh_ttl_secs),
        }
    }

    /// Register a new user.
    pub async fn register(&self, req: RegisterRequest) -> Result<User> {
        req.validate()?;

        let password_hash = password::hash_password(&req.password)?;
        let user = self
            .users
            .create(NewUser {
                first_name: req.first_name,
                last_name: req.last_name,
                username: req.username,
                email: req.email,
                password_hash,
            })
            .await?;

        info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Verify credentials and issue an access/refresh pair.
    ///
    /// Unknown email and wrong password produce the same error, and both
    /// branches run one Argon2 verification so neither can be told apart
    /// by timing.
    pub async fn login(&self, req: LoginRequest) -> Result<UserWithAuth> {
        req.validate()?;

        let user = match self.users.get_by_email(&req.email).await? {
            Some(user) => user,
            None => {
                let _ = password::verify_password(&req.password, DUMMY_HASH);
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !password::verify_password(&req.password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let auth = self.issue_session(&user).await?;

        info!(user_id = %user.id, "user logged in");
        Ok(UserWithAuth { auth, user })
    }

    /// Redeem a refresh secret for a new access/refresh pair, revoking the
    /// old record. Exactly one redemption of a given secret can succeed.
    pub async fn refresh(&self, secret: &str) -> Result<UserWithAuth> {
        let record = self
            .refresh_tokens
            .get_by_token(secret)
            .await?
            .ok_or(AuthError::InvalidRefreshToken)?;

        let now = Utc::now();
        if record.is_expired(now) {
            // Expired records stay untouched; expiry is enforced on every
            // read, so revocation bookkeeping would change nothing.
            return Err(AuthError::ExpiredRefreshToken);
        }

        if record.is_revoked() {
            warn!(
                user_id = %record.user_id,
                token_id = %record.id,
                "already-revoked refresh token presented; possible replay"
            );
            return Err(AuthError::RevokedRefreshToken);
        }

        let user = self
            .users
            .get_by_id(record.user_id)
            .await?
            .ok_or(AuthError::InvalidRefreshToken)?;

        if record.version != user.refresh_token_version {
            // A global invalidation happened after issuance.
            return Err(AuthError::RefreshVersionMismatch);
        }

        // Revoke iff still unrevoked. Losing this race means another
        // redemption of the same secret already rotated it.
        if !self.refresh_tokens.revoke_by_id(record.id).await? {
            warn!(
                user_id = %record.user_id,
                token_id = %record.id,
                "lost rotation race; concurrent redemption of one secret"
            );
            return Err(AuthError::RevokedRefreshToken);
        }

        let auth = self.issue_session(&user).await?;

        info!(user_id = %user.id, token_id = %record.id, "refresh token rotated");
        Ok(UserWithAuth { auth, user })
    }

    /// Validate an access token against the live user record.
    ///
    /// The user's version is re-read on every call rather than trusted
    /// from the claim alone, so a revoke-all invalidates already-issued
    /// tokens immediately instead of at their natural expiry.
    pub async fn validate_access(&self, token: &str) -> Result<AuthContext> {
        let claims = self.tokens.validate_access_token(token)?;

        let user = self
            .users
            .get_by_id(claims.sub)
            .await?
            .ok_or(AuthError::InvalidAccessToken)?;

        if claims.rtv != user.refresh_token_version {
            return Err(AuthError::InvalidAccessToken);
        }

        Ok(AuthContext {
            user,
            token_version: claims.rtv,
        })
    }

    /// Invalidate every outstanding token for the user by bumping the
    /// version counter. No per-record writes.
    pub async fn revoke_all(&self, user_id: Uuid) -> Result<i32> {
        let version = self.users.bump_token_version(user_id).await?;
        info!(user_id = %user_id, version, "all sessions revoked");
        Ok(version)
    }

    /// Mint an access token and persist a fresh refresh record, both
    /// stamped with the user's current version.
    async fn issue_session(&self, user: &User) -> Result<AuthInfo> {
        let access_token = self
            .tokens
            .generate_access_token(user.id, user.refresh_token_version)?;
        let expires_at = Utc::now() + self.refresh_ttl;

        for _ in 0..MAX_SECRET_ATTEMPTS {
            let secret = generate_refresh_secret();
            match self
                .refresh_tokens
                .create(NewRefreshToken {
                    user_id: user.id,
                    token: secret,
                    version: user.refresh_token_version,
                    expires_at,
                })
                .await
            {
                Ok(record) => {
                    return Ok(AuthInfo {
                        token: access_token,
                        refresh_token: record.token,
                        token_type: "Bearer".to_string(),
                        expires_at: record.expires_at,
                    })
                }
                Err(AuthError::RefreshSecretConflict) => {
                    warn!(user_id = %user.id, "refresh secret collision; regenerating");
                    continue;
                }
                Err(e) => return Err(e),
            }
        }

        Err(AuthError::Internal(
            "exhausted refresh secret generation attempts".to_string(),
        ))
    }
}
