#![allow(dead_code)]
//! In-memory store doubles for exercising the session service without a
//! live database. `revoke_by_id` mirrors the production compare-and-set
//! semantics so rotation-race tests are meaningful.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use auth_service::config::JwtSettings;
use auth_service::error::AuthError;
use auth_service::models::{NewRefreshToken, NewUser, RefreshToken, RegisterRequest, User};
use auth_service::service::SessionService;
use auth_service::store::{RefreshTokenStore, UserStore};
use auth_service::Result;
use chrono::Utc;
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryUserStore {
    users: Mutex<Vec<User>>,
}

impl InMemoryUserStore {
    /// Flip the blocked flag on a user, bypassing the service.
    pub fn set_blocked(&self, id: Uuid, blocked: bool) {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id == id) {
            user.is_blocked = blocked;
            user.updated_at = Utc::now();
        }
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create(&self, user: NewUser) -> Result<User> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(AuthError::EmailAlreadyExists);
        }
        if users.iter().any(|u| u.username == user.username) {
            return Err(AuthError::UsernameAlreadyExists);
        }

        let now = Utc::now();
        let created = User {
            id: Uuid::new_v4(),
            first_name: user.first_name,
            last_name: user.last_name,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            refresh_token_version: 0,
            is_blocked: false,
            is_deleted: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };
        users.push(created.clone());
        Ok(created)
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|u| u.email == email && !u.is_blocked)
            .cloned())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == id && !u.is_blocked).cloned())
    }

    async fn bump_token_version(&self, id: Uuid) -> Result<i32> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(AuthError::UserNotFound)?;
        user.refresh_token_version += 1;
        user.updated_at = Utc::now();
        Ok(user.refresh_token_version)
    }
}

#[derive(Default)]
pub struct InMemoryRefreshTokenStore {
    tokens: Mutex<Vec<RefreshToken>>,
}

impl InMemoryRefreshTokenStore {
    /// Peek at a record by secret, bypassing the service.
    pub fn record_for(&self, secret: &str) -> Option<RefreshToken> {
        self.tokens
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.token == secret)
            .cloned()
    }
}

#[async_trait]
impl RefreshTokenStore for InMemoryRefreshTokenStore {
    async fn create(&self, token: NewRefreshToken) -> Result<RefreshToken> {
        let mut tokens = self.tokens.lock().unwrap();
        if tokens.iter().any(|t| t.token == token.token) {
            return Err(AuthError::RefreshSecretConflict);
        }

        let now = Utc::now();
        let record = RefreshToken {
            id: Uuid::new_v4(),
            user_id: token.user_id,
            token: token.token,
            version: token.version,
            expires_at: token.expires_at,
            created_at: now,
            updated_at: now,
            revoked_at: None,
        };
        tokens.push(record.clone());
        Ok(record)
    }

    async fn get_by_token(&self, secret: &str) -> Result<Option<RefreshToken>> {
        let tokens = self.tokens.lock().unwrap();
        Ok(tokens.iter().find(|t| t.token == secret).cloned())
    }

    async fn revoke_by_id(&self, id: Uuid) -> Result<bool> {
        // Revoke only if currently unrevoked, under one lock acquisition:
        // the same single-winner guarantee as the SQL conditional update.
        let mut tokens = self.tokens.lock().unwrap();
        match tokens.iter_mut().find(|t| t.id == id) {
            Some(record) if record.revoked_at.is_none() => {
                let now = Utc::now();
                record.revoked_at = Some(now);
                record.updated_at = now;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

pub fn test_jwt_settings() -> JwtSettings {
    JwtSettings {
        secret: "integration-test-signing-secret".to_string(),
        issuer: "auth-service".to_string(),
        audience: "api".to_string(),
        access_ttl_secs: 900,
        refresh_ttl_secs: 604800,
    }
}

pub struct TestHarness {
    pub service: Arc<SessionService>,
    pub users: Arc<InMemoryUserStore>,
    pub refresh_tokens: Arc<InMemoryRefreshTokenStore>,
}

pub fn harness() -> TestHarness {
    harness_with(test_jwt_settings())
}

pub fn harness_with(jwt: JwtSettings) -> TestHarness {
    let users = Arc::new(InMemoryUserStore::default());
    let refresh_tokens = Arc::new(InMemoryRefreshTokenStore::default());
    let service = Arc::new(SessionService::new(
        users.clone(),
        refresh_tokens.clone(),
        &jwt,
    ));
    TestHarness {
        service,
        users,
        refresh_tokens,
    }
}

pub fn register_request(email: &str, username: &str, password: &str) -> RegisterRequest {
    RegisterRequest {
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        username: username.to_string(),
        email: email.to_string(),
        password: password.to_string(),
    }
}
