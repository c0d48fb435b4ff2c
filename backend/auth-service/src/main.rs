//! Auth Service Main Entry Point
//!
//! Starts the HTTP server with:
//! - PostgreSQL connection pool
//! - Database migrations
//! - Session service (credential verification, token lifecycle)
//! - Graceful shutdown on Ctrl+C / SIGTERM

use anyhow::{Context, Result};
use auth_service::{
    config::Settings,
    http::{build_router, AppState},
    service::SessionService,
    store::{PgRefreshTokenStore, PgUserStore},
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::oneshot;
use tracing::{info, warn};

/// Bound on draining in-flight requests after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "auth_service=info,info".into()))
        .with_target(false)
        .json()
        .init();

    info!("Starting Auth Service");

    // Load configuration
    let settings = Settings::load().context("Failed to load configuration")?;
    info!("Configuration loaded successfully");

    // Initialize database connection pool
    let db_pool = PgPoolOptions::new()
        .max_connections(settings.database.max_connections)
        .min_connections(settings.database.min_connections)
        .acquire_timeout(Duration::from_secs(settings.database.acquire_timeout))
        .connect(&settings.database.url)
        .await
        .context("Failed to connect to PostgreSQL")?;

    info!(
        "Database pool initialized with {} max connections",
        settings.database.max_connections
    );

    // Run database migrations
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .context("Failed to run database migrations")?;
    info!("Database migrations completed");

    // Wire stores into the session service
    let users = Arc::new(PgUserStore::new(db_pool.clone()));
    let refresh_tokens = Arc::new(PgRefreshTokenStore::new(db_pool.clone()));
    let service = Arc::new(SessionService::new(users, refresh_tokens, &settings.jwt));

    let app = build_router(AppState { service });

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind server address")?;

    info!("Starting HTTP server on {}", addr);

    // In-flight requests get a bounded grace period after the signal;
    // the store closes only once the server has drained or the grace
    // period has elapsed.
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown_rx.await.ok();
            })
            .await
    });

    shutdown_signal().await;
    let _ = shutdown_tx.send(());

    match tokio::time::timeout(SHUTDOWN_GRACE, server).await {
        Ok(served) => served
            .context("server task panicked")?
            .context("HTTP server error")?,
        Err(_) => warn!(
            "in-flight requests still draining after {:?}; shutting down anyway",
            SHUTDOWN_GRACE
        ),
    }

    db_pool.close().await;
    info!("Auth service shutdown complete");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }

    info!("Shutting down gracefully...");
}
