//! Refresh-token database operations

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AuthError, Result};
use crate::models::{NewRefreshToken, RefreshToken};
use crate::store::{bounded, RefreshTokenStore};

const TOKEN_COLUMNS: &str =
    "id, user_id, token, version, expires_at, created_at, updated_at, revoked_at";

#[derive(Clone)]
pub struct PgRefreshTokenStore {
    pool: PgPool,
}

impl PgRefreshTokenStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_token_db_error(err: sqlx::Error) -> AuthError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.constraint() == Some("refresh_tokens_token_key") {
            return AuthError::RefreshSecretConflict;
        }
    }
    AuthError::from(err)
}

#[async_trait]
impl RefreshTokenStore for PgRefreshTokenStore {
    async fn create(&self, token: NewRefreshToken) -> Result<RefreshToken> {
        bounded(async {
            let query = format!(
                r#"
                INSERT INTO refresh_tokens (id, user_id, token, version, expires_at)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING {TOKEN_COLUMNS}
                "#
            );

            sqlx::query_as::<_, RefreshToken>(&query)
                .bind(Uuid::new_v4())
                .bind(token.user_id)
                .bind(&token.token)
                .bind(token.version)
                .bind(token.expires_at)
                .fetch_one(&self.pool)
                .await
                .map_err(map_token_db_error)
        })
        .await
    }

    async fn get_by_token(&self, secret: &str) -> Result<Option<RefreshToken>> {
        bounded(async {
            let query = format!(
                r#"
                SELECT {TOKEN_COLUMNS}
                FROM refresh_tokens
                WHERE token = $1
                "#
            );

            sqlx::query_as::<_, RefreshToken>(&query)
                .bind(secret)
                .fetch_optional(&self.pool)
                .await
                .map_err(AuthError::from)
        })
        .await
    }

    async fn revoke_by_id(&self, id: Uuid) -> Result<bool> {
        bounded(async {
            // Compare-and-set on the revocation column: under concurrent
            // redemptions of one secret only a single caller sees a row
            // change here.
            let result = sqlx::query(
                r#"
                UPDATE refresh_tokens
                SET revoked_at = NOW(), updated_at = NOW()
                WHERE id = $1 AND revoked_at IS NULL
                "#,
            )
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AuthError::from)?;

            Ok(result.rows_affected() == 1)
        })
        .await
    }
}
