//! Branch Transfer Service - Main Application Entry Point
//!
//! REST API server for an internal money-transfer network: branches with
//! dual-currency tills, a fund ledger behind every balance, transfer
//! transactions with tax, role-gated staff accounts, notifications,
//! reporting, and backup/restore.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Database**: PostgreSQL with sqlx (async queries)
//! - **Authentication**: bearer JWT, Argon2-hashed passwords
//! - **Format**: JSON requests/responses
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Create database connection pool
//! 3. Run database migrations
//! 4. Bootstrap the director account on an empty database
//! 5. Build HTTP router with routes and middleware
//! 6. Start server on configured port

mod cache;
mod config;
mod db;
mod error;
mod handlers;
mod middleware;
mod models;
mod services;
mod state;

use std::time::Duration;

use axum::{
    Router, middleware as axum_middleware,
    routing::{delete, get, post, put},
};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Reads RUST_LOG, defaults to "info"
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = config::Config::from_env()?;
    tracing::info!("Configuration loaded");

    let pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Database pool created");

    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations complete");

    db::bootstrap_director(&pool, &config.bootstrap_password)
        .await
        .map_err(|e| anyhow::anyhow!("bootstrap failed: {e}"))?;

    let state = AppState::new(
        pool,
        &config.jwt_secret,
        Duration::from_secs(config.cache_ttl_secs),
    );

    // Everything except login and health sits behind the token middleware.
    let authenticated_routes = Router::new()
        // Authentication
        .route(
            "/api/v1/auth/change-password",
            post(handlers::auth::change_password),
        )
        // Branch management
        .route("/api/v1/branches", get(handlers::branches::list_branches))
        .route("/api/v1/branches", post(handlers::branches::create_branch))
        .route("/api/v1/branches/{id}", get(handlers::branches::get_branch))
        .route(
            "/api/v1/branches/{id}",
            put(handlers::branches::update_branch),
        )
        .route(
            "/api/v1/branches/{id}",
            delete(handlers::branches::delete_branch),
        )
        // Fund ledger
        .route(
            "/api/v1/branches/{id}/allocations",
            post(handlers::allocations::allocate_funds),
        )
        .route(
            "/api/v1/branches/{id}/allocations",
            get(handlers::allocations::list_allocations),
        )
        .route(
            "/api/v1/allocations/{event_id}",
            delete(handlers::allocations::delete_allocation),
        )
        // Staff management
        .route(
            "/api/v1/employees",
            get(handlers::employees::list_employees),
        )
        .route(
            "/api/v1/employees",
            post(handlers::employees::create_employee),
        )
        .route(
            "/api/v1/employees/{id}",
            get(handlers::employees::get_employee),
        )
        .route(
            "/api/v1/employees/{id}",
            put(handlers::employees::update_employee),
        )
        .route(
            "/api/v1/employees/{id}",
            delete(handlers::employees::delete_employee),
        )
        // Transfers
        .route(
            "/api/v1/transactions",
            post(handlers::transactions::create_transaction),
        )
        .route(
            "/api/v1/transactions",
            get(handlers::transactions::list_transactions),
        )
        .route(
            "/api/v1/transactions/{id}",
            get(handlers::transactions::get_transaction),
        )
        .route(
            "/api/v1/transactions/{id}/complete",
            post(handlers::transactions::complete_transaction),
        )
        .route(
            "/api/v1/transactions/{id}/cancel",
            post(handlers::transactions::cancel_transaction),
        )
        // Reports
        .route("/api/v1/reports/profits", get(handlers::reports::profits))
        .route(
            "/api/v1/reports/statistics",
            get(handlers::reports::statistics),
        )
        .route(
            "/api/v1/reports/transactions",
            get(handlers::reports::transactions),
        )
        .route(
            "/api/v1/reports/employees",
            get(handlers::reports::employees),
        )
        // Notifications
        .route(
            "/api/v1/notifications",
            get(handlers::notifications::list_notifications),
        )
        .route(
            "/api/v1/notifications/{id}/read",
            post(handlers::notifications::mark_read),
        )
        // Backup and restore
        .route("/api/v1/admin/backup", get(handlers::admin::backup))
        .route("/api/v1/admin/restore", post(handlers::admin::restore))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::auth_middleware,
        ));

    let app = Router::new()
        // Public routes
        .route("/health", get(handlers::health::health_check))
        .route("/api/v1/auth/login", post(handlers::auth::login))
        .merge(authenticated_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
