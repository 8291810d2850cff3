//! Checkout and sale administration.
//!
//! `POST /sales` is open to anonymous callers; everything else needs an
//! admin token.

use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::info;

use warung_core::filter::{RawSalesQuery, SalesFilter};
use warung_core::validation::{non_blank, validate_notes};
use warung_core::{
    CartLine, NewSale, PaymentMethod, SaleStatus, SaleUpdate, SaleWithItems, ValidationError,
};

use crate::auth::{AdminUser, OptionalPrincipal};
use crate::error::ApiResult;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::routes::MessageBody;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSaleRequest {
    pub customer_id: Option<i64>,
    #[serde(default)]
    pub items: Vec<CartLine>,
    /// `cash` when absent.
    pub payment_method: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSaleRequest {
    pub status: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SaleBody {
    pub sale: SaleWithItems,
}

#[derive(Debug, Serialize)]
pub struct SalesBody {
    pub sales: Vec<SaleWithItems>,
}

/// `POST /sales`
pub async fn create_sale(
    State(state): State<AppState>,
    OptionalPrincipal(principal): OptionalPrincipal,
    AppJson(request): AppJson<CreateSaleRequest>,
) -> ApiResult<(StatusCode, AppJson<SaleBody>)> {
    let payment_method = non_blank(request.payment_method.as_deref())
        .map(str::parse::<PaymentMethod>)
        .transpose()?
        .unwrap_or_default();

    let new_sale = NewSale {
        customer_id: request.customer_id,
        items: request.items,
        payment_method,
        notes: request.notes,
    };

    let sale = state.db.sales().create_sale(&new_sale).await?;
    info!(
        sale_id = sale.sale.id,
        cashier = ?principal.as_ref().map(|p| &p.username),
        "Checkout completed"
    );

    Ok((StatusCode::CREATED, AppJson(SaleBody { sale })))
}

/// `GET /sales?startDate=&endDate=&status=&customerId=`
pub async fn list_sales(
    State(state): State<AppState>,
    _admin: AdminUser,
    AppQuery(raw): AppQuery<RawSalesQuery>,
) -> ApiResult<AppJson<SalesBody>> {
    let filter = SalesFilter::from_raw(&raw, state.report_offset)?;
    let sales = state.db.sales().list(&filter).await?;
    Ok(AppJson(SalesBody { sales }))
}

/// `GET /sales/{id}`
pub async fn get_sale(
    State(state): State<AppState>,
    _admin: AdminUser,
    AppPath(id): AppPath<i64>,
) -> ApiResult<AppJson<SaleBody>> {
    let sale = state.db.sales().get(id).await?;
    Ok(AppJson(SaleBody { sale }))
}

/// `PUT /sales/{id}` with `{status?, notes?}`. Stock is not touched.
pub async fn update_sale(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    AppPath(id): AppPath<i64>,
    AppJson(request): AppJson<UpdateSaleRequest>,
) -> ApiResult<AppJson<SaleBody>> {
    let status = non_blank(request.status.as_deref())
        .map(str::parse::<SaleStatus>)
        .transpose()?;
    if let Some(notes) = &request.notes {
        validate_notes(notes)?;
    }

    let update = SaleUpdate {
        status,
        notes: request.notes,
    };
    if update.is_empty() {
        return Err(ValidationError::Required {
            field: "status or notes".to_string(),
        }
        .into());
    }
    let sale = state.db.sales().update(id, &update).await?;
    info!(sale_id = id, status = %sale.sale.status, by = %admin.username, "Sale updated");

    Ok(AppJson(SaleBody { sale }))
}

/// `DELETE /sales/{id}`. Stock is not restored.
pub async fn delete_sale(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    AppPath(id): AppPath<i64>,
) -> ApiResult<AppJson<MessageBody>> {
    state.db.sales().delete(id).await?;
    info!(sale_id = id, by = %admin.username, "Sale deleted via API");

    Ok(AppJson(MessageBody::new("Sale deleted")))
}
