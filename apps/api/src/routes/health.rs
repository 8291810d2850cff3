//! Liveness and database health.

use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;
use warung_db::migrations::migration_status;

use crate::extract::AppJson;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthBody {
    pub status: &'static str,
    pub database: &'static str,
    pub pending_migrations: usize,
}

/// `GET /health`: 200 when the database answers, 503 otherwise.
pub async fn health(State(state): State<AppState>) -> (StatusCode, AppJson<HealthBody>) {
    if !state.db.health_check().await {
        let body = HealthBody {
            status: "unavailable",
            database: "unreachable",
            pending_migrations: 0,
        };
        return (StatusCode::SERVICE_UNAVAILABLE, AppJson(body));
    }

    let pending = match migration_status(state.db.pool()).await {
        Ok((total, applied)) => total.saturating_sub(applied),
        Err(_) => 0,
    };

    let body = HealthBody {
        status: "ok",
        database: "connected",
        pending_migrations: pending,
    };
    (StatusCode::OK, AppJson(body))
}
