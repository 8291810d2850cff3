//! # Warung API
//!
//! HTTP server for the warung storefront.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Warung API Server                              │
//! │                                                                         │
//! │  Client ──► axum (8080) ──► TraceLayer ──► extractors ──► handlers     │
//! │                                   │            │              │         │
//! │                                   │      AdminUser /          │         │
//! │                                   │      OptionalPrincipal    ▼         │
//! │                                   │      (JwtManager)     warung-db     │
//! │                                   ▼                       (SQLite)      │
//! │                              tracing spans                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables (see [`config`]):
//! - `WARUNG_PORT` - HTTP port (default: 8080)
//! - `WARUNG_DATABASE_PATH` - SQLite file (default: warung.db)
//! - `WARUNG_JWT_SECRET` - Secret for JWT signing (required in production)
//! - `WARUNG_TOKEN_TTL_HOURS` - Token lifetime (default: 24)
//! - `WARUNG_REPORT_UTC_OFFSET` - Report timezone (default: +07:00)
//! - `WARUNG_ADMIN_USERNAME` / `WARUNG_ADMIN_PASSWORD` - Bootstrap admin

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

use warung_core::Role;
use warung_db::{hash_password, Database, DbResult};

// Re-exports
pub use auth::JwtManager;
pub use config::AppConfig;
pub use error::ApiError;
pub use state::AppState;

/// Builds the application with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    routes::router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Creates the configured admin if no user exists yet.
///
/// Returns whether an admin was created.
pub async fn bootstrap_admin(db: &Database, config: &AppConfig) -> DbResult<bool> {
    let (Some(username), Some(password)) = (&config.admin_username, &config.admin_password) else {
        return Ok(false);
    };

    if db.users().count().await? > 0 {
        return Ok(false);
    }

    let hash = hash_password(password)?;
    let admin = db.users().create(username.trim(), &hash, Role::Admin).await?;
    info!(user_id = admin.id, username = %admin.username, "Bootstrap admin created");
    Ok(true)
}
