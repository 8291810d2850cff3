//! Admin product management.

use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;
use tracing::info;

use warung_core::filter::{ProductQuery, RawProductQuery};
use warung_core::validation::{validate_new_product, validate_product_patch};
use warung_core::{NewProduct, Product, ProductPage, ProductPatch, ValidationError};

use crate::auth::AdminUser;
use crate::error::ApiResult;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::routes::MessageBody;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProductBody {
    pub product: Product,
}

/// `GET /products`
pub async fn list_products(
    State(state): State<AppState>,
    _admin: AdminUser,
    AppQuery(raw): AppQuery<RawProductQuery>,
) -> ApiResult<AppJson<ProductPage>> {
    let query = ProductQuery::from_raw(&raw)?;
    Ok(AppJson(state.db.products().list(&query).await?))
}

/// `POST /products`
pub async fn create_product(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    AppJson(new_product): AppJson<NewProduct>,
) -> ApiResult<(StatusCode, AppJson<ProductBody>)> {
    validate_new_product(&new_product)?;

    let product = state.db.products().create(&new_product).await?;
    info!(product_id = product.id, by = %admin.username, "Product created");

    Ok((StatusCode::CREATED, AppJson(ProductBody { product })))
}

/// `GET /products/{id}`
pub async fn get_product(
    State(state): State<AppState>,
    _admin: AdminUser,
    AppPath(id): AppPath<i64>,
) -> ApiResult<AppJson<ProductBody>> {
    let product = state.db.products().get(id).await?;
    Ok(AppJson(ProductBody { product }))
}

/// `PUT /products/{id}` with any subset of the product fields.
pub async fn update_product(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    AppPath(id): AppPath<i64>,
    AppJson(patch): AppJson<ProductPatch>,
) -> ApiResult<AppJson<ProductBody>> {
    if patch.is_empty() {
        return Err(ValidationError::Required {
            field: "at least one product field".to_string(),
        }
        .into());
    }
    validate_product_patch(&patch)?;

    let product = state.db.products().update(id, &patch).await?;
    info!(product_id = id, by = %admin.username, "Product updated");

    Ok(AppJson(ProductBody { product }))
}

/// `DELETE /products/{id}`
pub async fn delete_product(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    AppPath(id): AppPath<i64>,
) -> ApiResult<AppJson<MessageBody>> {
    state.db.products().delete(id).await?;
    info!(product_id = id, by = %admin.username, "Product deleted");

    Ok(AppJson(MessageBody::new("Product deleted")))
}
