use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::user::User;

/// Token pair returned by login and refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthInfo {
    /// Signed access token (bearer, short-lived).
    pub token: String,
    /// Opaque refresh token secret.
    pub refresh_token: String,
    #[serde(rename = "type")]
    pub token_type: String,
    /// Absolute expiry of the refresh token.
    pub expires_at: DateTime<Utc>,
}

/// Login/refresh response body: tokens plus the sanitized user record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserWithAuth {
    pub auth: AuthInfo,
    pub user: User,
}

/// Identity resolved by the auth middleware, injected into request
/// extensions for downstream handlers.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user: User,
    /// Token version claim that was validated against the live record.
    pub token_version: i32,
}
