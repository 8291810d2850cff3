//! Shared application state.

use std::sync::Arc;

use chrono::FixedOffset;
use warung_db::Database;

use crate::auth::JwtManager;

/// Cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub jwt: Arc<JwtManager>,
    /// Offset used for report days and sales date filters.
    pub report_offset: FixedOffset,
}

impl AppState {
    pub fn new(db: Database, jwt: JwtManager, report_offset: FixedOffset) -> Self {
        AppState {
            db,
            jwt: Arc::new(jwt),
            report_offset,
        }
    }
}
