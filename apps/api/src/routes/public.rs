//! Unauthenticated catalog browsing.

use axum::extract::State;

use warung_core::filter::{ProductQuery, RawProductQuery};
use warung_core::ProductPage;

use crate::error::ApiResult;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::routes::products::ProductBody;
use crate::state::AppState;

/// `GET /public/products?category=&search=&page=&limit=`
pub async fn list_products(
    State(state): State<AppState>,
    AppQuery(raw): AppQuery<RawProductQuery>,
) -> ApiResult<AppJson<ProductPage>> {
    let query = ProductQuery::from_raw(&raw)?;
    let page = state.db.products().list(&query).await?;
    Ok(AppJson(page))
}

/// `GET /public/products/{id}`
pub async fn get_product(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> ApiResult<AppJson<ProductBody>> {
    let product = state.db.products().get(id).await?;
    Ok(AppJson(ProductBody { product }))
}
