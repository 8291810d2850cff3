//! # Routes
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  /health                    GET            none                        │
//! │  /auth/login                POST           none                        │
//! │  /auth/me                   GET            any token                   │
//! │  /public/products[/{id}]    GET            none                        │
//! │  /products[/{id}]           GET/POST/PUT/DELETE   admin                │
//! │  /sales                     POST           optional token              │
//! │  /sales                     GET            admin                       │
//! │  /sales/{id}                GET/PUT/DELETE admin                       │
//! │  /sales/daily|monthly|yearly GET           admin                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;

use crate::state::AppState;

pub mod auth;
pub mod health;
pub mod products;
pub mod public;
pub mod reports;
pub mod sales;

/// `{"message": ...}` for deletes.
#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        MessageBody {
            message: message.into(),
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        .route("/public/products", get(public::list_products))
        .route("/public/products/{id}", get(public::get_product))
        .route(
            "/products",
            get(products::list_products).post(products::create_product),
        )
        .route(
            "/products/{id}",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .route("/sales", post(sales::create_sale).get(sales::list_sales))
        .route("/sales/daily", get(reports::daily))
        .route("/sales/monthly", get(reports::monthly))
        .route("/sales/yearly", get(reports::yearly))
        .route(
            "/sales/{id}",
            get(sales::get_sale)
                .put(sales::update_sale)
                .delete(sales::delete_sale),
        )
}
