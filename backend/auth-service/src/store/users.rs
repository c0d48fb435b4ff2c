//! User database operations

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AuthError, Result};
use crate::models::{NewUser, User};
use crate::store::{bounded, UserStore};

const USER_COLUMNS: &str = "id, first_name, last_name, username, email, password_hash, \
     refresh_token_version, is_blocked, is_deleted, deleted_at, created_at, updated_at";

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map unique-constraint violations on the users table to typed conflicts.
fn map_user_db_error(err: sqlx::Error) -> AuthError {
    if let Some(db_err) = err.as_database_error() {
        match db_err.constraint() {
            Some("users_email_key") => return AuthError::EmailAlreadyExists,
            Some("users_username_key") => return AuthError::UsernameAlreadyExists,
            _ => {}
        }
    }
    AuthError::from(err)
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, user: NewUser) -> Result<User> {
        bounded(async {
            let query = format!(
                r#"
                INSERT INTO users (id, first_name, last_name, username, email, password_hash)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING {USER_COLUMNS}
                "#
            );

            sqlx::query_as::<_, User>(&query)
                .bind(Uuid::new_v4())
                .bind(&user.first_name)
                .bind(&user.last_name)
                .bind(&user.username)
                .bind(&user.email)
                .bind(&user.password_hash)
                .fetch_one(&self.pool)
                .await
                .map_err(map_user_db_error)
        })
        .await
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        bounded(async {
            let query = format!(
                r#"
                SELECT {USER_COLUMNS}
                FROM users
                WHERE email = $1 AND is_blocked = false
                "#
            );

            sqlx::query_as::<_, User>(&query)
                .bind(email)
                .fetch_optional(&self.pool)
                .await
                .map_err(AuthError::from)
        })
        .await
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>> {
        bounded(async {
            let query = format!(
                r#"
                SELECT {USER_COLUMNS}
                FROM users
                WHERE id = $1 AND is_blocked = false
                "#
            );

            sqlx::query_as::<_, User>(&query)
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(AuthError::from)
        })
        .await
    }

    async fn bump_token_version(&self, id: Uuid) -> Result<i32> {
        bounded(async {
            let version: Option<(i32,)> = sqlx::query_as(
                r#"
                UPDATE users
                SET refresh_token_version = refresh_token_version + 1, updated_at = NOW()
                WHERE id = $1
                RETURNING refresh_token_version
                "#,
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AuthError::from)?;

            version.map(|(v,)| v).ok_or(AuthError::UserNotFound)
        })
        .await
    }
}
