//! HTTP API surface.
//!
//! Routes:
//! - `POST /v1/auth/register` — create a user
//! - `POST /v1/auth/login` — credentials in, access/refresh pair out
//! - `POST /v1/auth/refresh` — rotate a refresh token
//! - `GET  /v1/users/me` — authenticated; resolved identity from context
//! - `GET  /health` — liveness
//!
//! The auth middleware validates the bearer token against the live user
//! record and injects the resolved [`AuthContext`] into request extensions
//! for downstream handlers.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use serde_json::json;
use tower_http::trace::TraceLayer;
use validator::Validate;

use crate::error::AuthError;
use crate::models::{AuthContext, LoginRequest, RefreshRequest, RegisterRequest};
use crate::service::SessionService;

/// Shared HTTP server state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SessionService>,
}

/// Build the HTTP router with all API endpoints
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/v1/users/me", get(me))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/v1/auth/register", post(register))
        .route("/v1/auth/login", post(login))
        .route("/v1/auth/refresh", post(refresh))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint (no auth required)
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AuthError> {
    state.service.register(payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Successfully created user." })),
    ))
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let response = state.service.login(payload).await?;
    Ok(Json(response))
}

async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<impl IntoResponse, AuthError> {
    payload.validate()?;
    let response = state.service.refresh(&payload.refresh_token).await?;
    Ok(Json(response))
}

/// Resolved identity for the authenticated caller
async fn me(Extension(ctx): Extension<AuthContext>) -> impl IntoResponse {
    Json(json!({
        "user": ctx.user,
        "refresh_token_version": ctx.token_version,
    }))
}

/// Authentication middleware - validates `Authorization: Bearer <token>`
/// through the session service and injects the resolved identity.
async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(request.headers()).map(str::to_owned) else {
        return AuthError::InvalidAccessToken.into_response();
    };

    match state.service.validate_access(&token).await {
        Ok(ctx) => {
            request.extensions_mut().insert(ctx);
            next.run(request).await
        }
        Err(err) => err.into_response(),
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if scheme != "Bearer" || token.is_empty() {
        return None;
    }
    Some(token)
}
