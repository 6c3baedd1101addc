//! colony_ledger - Moderator bookkeeping backend
//!
//! Backend API for a moderator-operated console running a two-table
//! tabletop trading game. Game actions are persisted as hash-chained log
//! entries plus mutable state rows; prices and accruals are evaluated
//! lazily from checkpoints, never by a background timer.

use std::net::SocketAddr;

use axum::{middleware, routing::get, routing::post, Router};
use sqlx::postgres::PgPoolOptions;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use colony_ledger::api::{self, routes::AppState};
use colony_ledger::{db, Config};

/// Initialize tracing/logging
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "colony_ledger=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build the application router
fn build_router(state: AppState) -> Router {
    // Session-protected API routes
    // Note: Axum layers are applied in reverse order (last added = first executed)
    let protected_routes = api::create_router()
        .layer(middleware::from_fn_with_state(
            state.pool.clone(),
            api::middleware::session_middleware,
        ))
        .layer(middleware::from_fn(api::middleware::logging_middleware));

    // Login stays outside the session middleware
    let api_router = Router::new()
        .route("/login", post(api::routes::login))
        .merge(protected_routes);

    Router::new()
        // Health check (no session)
        .route("/health", get(health_check))
        .nest("/api/v1", api_router)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing();

    // Load configuration
    let config = Config::from_env()?;
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("Starting colony_ledger server");
    tracing::info!("Connecting to database...");

    // Create database pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await?;

    // Verify database schema
    if !db::check_schema(&pool).await? {
        tracing::error!("Database schema is not complete. Please run migrations.");
        return Err(anyhow::anyhow!("Database schema incomplete"));
    }

    tracing::info!("Database connected successfully");
    tracing::info!("Listening on http://{}", addr);

    let state = AppState {
        pool: pool.clone(),
        price_defaults: config.price_defaults,
        credit_overdue_secs: config.credit_overdue_secs,
        privateer_fee_fallback: config.privateer_fee_fallback,
    };

    // Build router and start server
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Cleanup
    tracing::info!("Server shutting down...");
    pool.close().await;
    tracing::info!("Database connections closed. Goodbye!");

    Ok(())
}

/// Shutdown signal handler for graceful shutdown
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}
