use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Persisted refresh-token record.
///
/// Records are soft-terminated: `revoked_at` marks a terminal state and the
/// row is never deleted, keeping an audit trail of every issued session.
/// Expiry is evaluated lazily from `expires_at` at read time and is never
/// written back.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RefreshToken {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Opaque high-entropy secret; unique lookup key.
    #[serde(skip_serializing)]
    pub token: String,
    /// Snapshot of the user's refresh_token_version at issuance.
    pub version: i32,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshToken {
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Fields required to insert a record; the store fills id and timestamps.
#[derive(Debug, Clone)]
pub struct NewRefreshToken {
    pub user_id: Uuid,
    pub token: String,
    pub version: i32,
    pub expires_at: DateTime<Utc>,
}
