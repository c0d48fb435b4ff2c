//! Storage contracts and Postgres implementations.
//!
//! The service talks to storage through capability-shaped traits so the
//! orchestration layer can be exercised against test doubles without a
//! live database. Every Postgres operation is bounded by a fixed timeout;
//! exceeding it cancels the call and surfaces a transient error instead of
//! hanging.

pub mod refresh_tokens;
pub mod users;

pub use refresh_tokens::PgRefreshTokenStore;
pub use users::PgUserStore;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{AuthError, Result};
use crate::models::{NewRefreshToken, NewUser, RefreshToken, User};

/// Ceiling for any single storage operation.
pub const QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// User persistence contract.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user; the store fills id and timestamps. Duplicate email
    /// or username maps to the corresponding conflict error.
    async fn create(&self, user: NewUser) -> Result<User>;

    /// Look up by email, excluding blocked users.
    async fn get_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Look up by id, excluding blocked users.
    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>>;

    /// Atomically increment the user's refresh_token_version and return
    /// the new value. O(1) revoke-all.
    async fn bump_token_version(&self, id: Uuid) -> Result<i32>;
}

/// Refresh-token persistence contract.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Insert a record; the store fills id and timestamps. A duplicate
    /// secret maps to `RefreshSecretConflict`.
    async fn create(&self, token: NewRefreshToken) -> Result<RefreshToken>;

    /// Look up by opaque secret.
    async fn get_by_token(&self, secret: &str) -> Result<Option<RefreshToken>>;

    /// Revoke iff currently unrevoked, as a single conditional update.
    /// Returns `true` when this call performed the revocation and `false`
    /// when the record was already revoked, so concurrent redemptions of
    /// one secret yield exactly one acting party. Idempotent.
    async fn revoke_by_id(&self, id: Uuid) -> Result<bool>;
}

/// Run a storage operation under [`QUERY_TIMEOUT`].
pub(crate) async fn bounded<T, F>(op: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::time::timeout(QUERY_TIMEOUT, op)
        .await
        .map_err(|_| AuthError::Timeout)?
}
