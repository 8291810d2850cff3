//! # Warung API
//!
//! Server entry point: configuration, database, bootstrap admin, HTTP.

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use warung_api::{bootstrap_admin, build_router, AppConfig, AppState, JwtManager};
use warung_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (RUST_LOG overrides the default filter)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,warung=debug,sqlx=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!("Starting warung API server...");

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;
    let report_offset = config.report_offset()?;
    info!(
        bind = %config.bind_address(),
        database = %config.database_path,
        environment = %config.environment,
        report_offset = %report_offset,
        "Configuration loaded"
    );

    // Connect to database (runs migrations)
    let db = Database::new(
        DbConfig::new(&config.database_path).max_connections(config.db_max_connections),
    )
    .await
    .context("Failed to open database")?;

    if bootstrap_admin(&db, &config).await? {
        info!("Users table was empty, bootstrap admin is ready");
    }

    let jwt = JwtManager::new(&config.jwt_secret(), config.token_ttl_secs());
    let state = AppState::new(db.clone(), jwt, report_offset);
    let app = build_router(state);

    let listener = TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address()))?;
    info!(addr = %config.bind_address(), "Starting HTTP server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
