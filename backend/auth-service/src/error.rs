use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid or expired token")]
    InvalidAccessToken,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Expired refresh token")]
    ExpiredRefreshToken,

    #[error("Revoked refresh token")]
    RevokedRefreshToken,

    #[error("Invalid refresh token version")]
    RefreshVersionMismatch,

    #[error("A user with that email already exists")]
    EmailAlreadyExists,

    #[error("A user with that username already exists")]
    UsernameAlreadyExists,

    #[error("Refresh token secret already exists")]
    RefreshSecretConflict,

    #[error("User not found")]
    UserNotFound,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Operation timed out")]
    Timeout,

    #[error("JWT error: {0}")]
    Jwt(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Map to an HTTP status and client-facing message.
    ///
    /// Credential and access-token failures collapse into one generic
    /// unauthorized message so the response never reveals whether the
    /// account exists, the password was wrong, or which token check failed.
    /// Internal failures return an opaque body; detail goes to the log sink.
    pub fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AuthError::InvalidCredentials | AuthError::UserNotFound => {
                (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string())
            }
            AuthError::InvalidAccessToken => (
                StatusCode::UNAUTHORIZED,
                "Invalid or expired token".to_string(),
            ),
            AuthError::InvalidRefreshToken
            | AuthError::ExpiredRefreshToken
            | AuthError::RevokedRefreshToken
            | AuthError::RefreshVersionMismatch
            | AuthError::EmailAlreadyExists
            | AuthError::UsernameAlreadyExists
            | AuthError::Validation(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AuthError::Timeout => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Service temporarily unavailable".to_string(),
            ),
            AuthError::RefreshSecretConflict
            | AuthError::Database(_)
            | AuthError::Jwt(_)
            | AuthError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        }
    }

    /// Whether the error is server-side and should be logged at error level.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            AuthError::RefreshSecretConflict
                | AuthError::Database(_)
                | AuthError::Timeout
                | AuthError::Jwt(_)
                | AuthError::Internal(_)
        )
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if self.is_internal() {
            tracing::error!(error = %self, "request failed");
        }
        let (status, message) = self.status_and_message();
        (status, Json(json!({ "error": message }))).into_response()
    }
}

// Conversions from external error types
impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {}", err);
        AuthError::Database(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        tracing::debug!("JWT rejection: {}", err);
        AuthError::InvalidAccessToken
    }
}

impl From<validator::ValidationErrors> for AuthError {
    fn from(err: validator::ValidationErrors) -> Self {
        AuthError::Validation(err.to_string())
    }
}
