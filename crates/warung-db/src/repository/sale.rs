//! # Sale Repository
//!
//! The sale transaction engine plus admin operations on recorded sales.
//!
//! ## Checkout Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   create_sale(new_sale)                                 │
//! │                                                                         │
//! │  0. validate_cart (pure, no I/O)      ── EmptyCart / quantity errors   │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │  1. for each line, in cart order:                                      │
//! │       UPDATE products                                                   │
//! │          SET stock = stock - :q                                         │
//! │        WHERE id = :id AND stock >= :q                                   │
//! │       RETURNING price, name                                             │
//! │         │                                                               │
//! │         ├── row  → price the line (snapshot price + name)              │
//! │         └── none → classify: ProductNotFound | InsufficientStock       │
//! │                    and ROLLBACK (transaction dropped)                   │
//! │  2. INSERT sales (total = Σ subtotal, status = completed)              │
//! │  3. INSERT sale_items (one per line, cart order)                       │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Stock Check
//! The stock check and the decrement are one statement, executed under
//! SQLite's write lock. Two checkouts racing for the last unit serialize on
//! that lock; the second sees `stock >= q` fail and gets no row back. This
//! holds for any number of server processes sharing the database file.
//!
//! The UPDATE is the first statement of the transaction, so the connection
//! asks for the write lock before reading anything and a busy writer is
//! waited on (busy timeout) rather than reported as a stale snapshot.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::sqlite::SqliteConnection;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info};

use crate::error::{CheckoutResult, DbError, DbResult};
use warung_core::checkout::{self, Receipt};
use warung_core::filter::SalesFilter;
use warung_core::validation::validate_notes;
use warung_core::{
    CartLine, CoreError, Money, NewSale, Sale, SaleItem, SaleStatus, SaleUpdate, SaleWithItems,
};

const SALE_COLUMNS: &str =
    "id, customer_id, total_amount, payment_method, status, notes, created_at, updated_at";

const ITEM_COLUMNS: &str =
    "id, sale_id, product_id, product_name, quantity, unit_price, subtotal";

// Aliased forms for joins and filtered listings.
const SALE_COLUMNS_S: &str =
    "s.id, s.customer_id, s.total_amount, s.payment_method, s.status, s.notes, s.created_at, s.updated_at";

const ITEM_COLUMNS_SI: &str =
    "si.id, si.sale_id, si.product_id, si.product_name, si.quantity, si.unit_price, si.subtotal";

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Records a sale, decrementing stock for every line atomically.
    ///
    /// ## Failure Order
    /// 1. Empty cart, oversized cart, non-positive quantity (before any I/O)
    /// 2. Missing product: the first missing id in cart order
    /// 3. Insufficient stock: the first short line in cart order
    ///
    /// On any failure nothing is written. Duplicate lines for one product are
    /// processed independently against the stock left by earlier lines.
    pub async fn create_sale(&self, new_sale: &NewSale) -> CheckoutResult<SaleWithItems> {
        checkout::validate_cart(&new_sale.items)?;
        if let Some(notes) = &new_sale.notes {
            validate_notes(notes)?;
        }

        let customer_id = new_sale.customer_id.filter(|id| *id != 0);
        let now = Utc::now();

        debug!(
            lines = new_sale.items.len(),
            customer_id = ?customer_id,
            payment_method = %new_sale.payment_method,
            "Creating sale"
        );

        let mut tx = self.pool.begin().await?;
        let mut receipt = Receipt::with_capacity(new_sale.items.len());

        for (index, line) in new_sale.items.iter().enumerate() {
            let decremented: Option<(i64, String)> = sqlx::query_as(
                r#"
                UPDATE products
                SET stock = stock - ?1, updated_at = ?2
                WHERE id = ?3 AND stock >= ?1
                RETURNING price, name
                "#,
            )
            .bind(line.quantity)
            .bind(now)
            .bind(line.product_id)
            .fetch_optional(&mut *tx)
            .await?;

            let Some((price, name)) = decremented else {
                let rejection = classify_shortfall(&mut *tx, &new_sale.items[index..]).await?;
                debug!(%rejection, "Sale rejected, rolling back");
                return Err(rejection.into());
            };

            receipt.push(checkout::price_line(line, name, Money::from_units(price))?)?;
        }

        let sale = sqlx::query_as::<_, Sale>(&format!(
            r#"
            INSERT INTO sales (
                customer_id, total_amount, payment_method, status, notes, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            RETURNING {SALE_COLUMNS}
            "#
        ))
        .bind(customer_id)
        .bind(receipt.total().units())
        .bind(new_sale.payment_method)
        .bind(SaleStatus::Completed)
        .bind(new_sale.notes.as_deref())
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(receipt.lines().len());
        for line in receipt.lines() {
            let item = sqlx::query_as::<_, SaleItem>(&format!(
                r#"
                INSERT INTO sale_items (
                    sale_id, product_id, product_name, quantity, unit_price, subtotal
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                RETURNING {ITEM_COLUMNS}
                "#
            ))
            .bind(sale.id)
            .bind(line.product_id)
            .bind(&line.product_name)
            .bind(line.quantity)
            .bind(line.unit_price.units())
            .bind(line.subtotal.units())
            .fetch_one(&mut *tx)
            .await?;
            items.push(item);
        }

        tx.commit().await?;

        info!(
            sale_id = sale.id,
            total = %receipt.total(),
            items = receipt.item_count(),
            "Sale recorded"
        );

        Ok(SaleWithItems { sale, items })
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Gets a sale with its items.
    pub async fn get(&self, id: i64) -> DbResult<SaleWithItems> {
        let sale = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Sale", id))?;

        let items = sqlx::query_as::<_, SaleItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM sale_items WHERE sale_id = ?1 ORDER BY id"
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(SaleWithItems { sale, items })
    }

    /// Lists sales matching the filter, newest first.
    pub async fn list(&self, filter: &SalesFilter) -> DbResult<Vec<SaleWithItems>> {
        debug!(?filter, "Listing sales");
        load_sales(&self.pool, filter, Order::NewestFirst).await
    }

    /// Counts all sales (any status).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // =========================================================================
    // Admin Mutations
    // =========================================================================

    /// Changes status and/or notes. Does not touch stock.
    pub async fn update(&self, id: i64, update: &SaleUpdate) -> DbResult<SaleWithItems> {
        debug!(id, status = ?update.status, "Updating sale");

        let result = sqlx::query(
            r#"
            UPDATE sales SET
                status = COALESCE(?2, status),
                notes = COALESCE(?3, notes),
                updated_at = ?4
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(update.status)
        .bind(update.notes.as_deref())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", id));
        }

        self.get(id).await
    }

    /// Deletes a sale and its items in one transaction. Does not restock.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting sale");

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM sale_items WHERE sale_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM sales WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", id));
        }

        tx.commit().await?;
        info!(id, "Sale deleted");
        Ok(())
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Explains why a conditional decrement matched no row.
///
/// `lines` starts at the failing line. Every earlier line already
/// decremented, so those products exist; a missing product further along
/// the cart still takes precedence over the shortfall.
async fn classify_shortfall(conn: &mut SqliteConnection, lines: &[CartLine]) -> DbResult<CoreError> {
    let mut first_short: Option<(String, i64, i64)> = None;

    for line in lines {
        let row: Option<(String, i64)> =
            sqlx::query_as("SELECT name, stock FROM products WHERE id = ?1")
                .bind(line.product_id)
                .fetch_optional(&mut *conn)
                .await?;

        match row {
            None => return Ok(CoreError::ProductNotFound(line.product_id)),
            Some((name, stock)) => {
                if first_short.is_none() {
                    first_short = Some((name, stock, line.quantity));
                }
            }
        }
    }

    let (product, available, requested) =
        first_short.ok_or_else(|| DbError::Internal("stock shortfall without a cart line".into()))?;

    Ok(CoreError::InsufficientStock {
        product,
        available,
        requested,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Order {
    NewestFirst,
    OldestFirst,
}

impl Order {
    fn sql(self) -> &'static str {
        match self {
            Order::NewestFirst => " ORDER BY s.created_at DESC, s.id DESC",
            Order::OldestFirst => " ORDER BY s.created_at ASC, s.id ASC",
        }
    }
}

fn push_sales_filter(builder: &mut QueryBuilder<'_, Sqlite>, filter: &SalesFilter) {
    builder.push(" WHERE 1 = 1");

    if let Some(from) = filter.created_from {
        builder.push(" AND s.created_at >= ").push_bind(from);
    }
    if let Some(before) = filter.created_before {
        builder.push(" AND s.created_at < ").push_bind(before);
    }
    if let Some(status) = filter.status {
        builder.push(" AND s.status = ").push_bind(status);
    }
    if let Some(customer_id) = filter.customer_id {
        builder.push(" AND s.customer_id = ").push_bind(customer_id);
    }
}

/// Loads matching sales and attaches their items with one extra query.
pub(crate) async fn load_sales(
    pool: &SqlitePool,
    filter: &SalesFilter,
    order: Order,
) -> DbResult<Vec<SaleWithItems>> {
    let mut sales_query = QueryBuilder::<Sqlite>::new(format!("SELECT {SALE_COLUMNS_S} FROM sales s"));
    push_sales_filter(&mut sales_query, filter);
    sales_query.push(order.sql());
    let sales = sales_query.build_query_as::<Sale>().fetch_all(pool).await?;

    if sales.is_empty() {
        return Ok(Vec::new());
    }

    let mut items_query = QueryBuilder::<Sqlite>::new(format!(
        "SELECT {ITEM_COLUMNS_SI} FROM sale_items si JOIN sales s ON s.id = si.sale_id"
    ));
    push_sales_filter(&mut items_query, filter);
    items_query.push(" ORDER BY si.sale_id, si.id");
    let items = items_query
        .build_query_as::<SaleItem>()
        .fetch_all(pool)
        .await?;

    let mut by_sale: HashMap<i64, Vec<SaleItem>> = HashMap::with_capacity(sales.len());
    for item in items {
        by_sale.entry(item.sale_id).or_default().push(item);
    }

    Ok(sales
        .into_iter()
        .map(|sale| {
            let items = by_sale.remove(&sale.id).unwrap_or_default();
            SaleWithItems { sale, items }
        })
        .collect())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CheckoutError;
    use crate::repository::test_support::{seed_product, test_db};
    use crate::{Database, DbConfig};
    use warung_core::{PaymentMethod, ProductPatch, ValidationError};

    fn line(product_id: i64, quantity: i64) -> CartLine {
        CartLine {
            product_id,
            quantity,
        }
    }

    async fn stock_of(db: &Database, id: i64) -> i64 {
        db.products().get(id).await.unwrap().stock
    }

    #[tokio::test]
    async fn test_sell_out_then_insufficient_stock() {
        let db = test_db().await;
        let product = seed_product(&db, "Indomie Goreng", 3_500, 5).await;

        let sale = db
            .sales()
            .create_sale(&NewSale::cash(vec![line(product.id, 5)]))
            .await
            .unwrap();
        assert_eq!(sale.sale.total_amount, 17_500);
        assert_eq!(sale.sale.status, SaleStatus::Completed);
        assert_eq!(stock_of(&db, product.id).await, 0);

        let err = db
            .sales()
            .create_sale(&NewSale::cash(vec![line(product.id, 1)]))
            .await
            .unwrap_err();
        match err {
            CheckoutError::Rejected(CoreError::InsufficientStock {
                product: name,
                available,
                requested,
            }) => {
                assert_eq!(name, "Indomie Goreng");
                assert_eq!(available, 0);
                assert_eq!(requested, 1);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
        assert_eq!(db.sales().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_lines_never_oversell() {
        let db = test_db().await;
        let product = seed_product(&db, "Aqua 600ml", 4_000, 5).await;

        let err = db
            .sales()
            .create_sale(&NewSale::cash(vec![line(product.id, 3), line(product.id, 3)]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Rejected(CoreError::InsufficientStock {
                available: 2,
                requested: 3,
                ..
            })
        ));

        let stock = stock_of(&db, product.id).await;
        assert!(stock >= 0);
        assert_eq!(stock, 5);
        assert_eq!(db.sales().count().await.unwrap(), 0);

        let sale = db
            .sales()
            .create_sale(&NewSale::cash(vec![line(product.id, 2), line(product.id, 3)]))
            .await
            .unwrap();
        assert_eq!(sale.items.len(), 2);
        assert_eq!(stock_of(&db, product.id).await, 0);
    }

    #[tokio::test]
    async fn test_empty_cart_is_invalid() {
        let db = test_db().await;
        let err = db
            .sales()
            .create_sale(&NewSale::cash(Vec::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::Rejected(CoreError::EmptyCart)));
    }

    #[tokio::test]
    async fn test_unknown_product_is_not_found() {
        let db = test_db().await;
        let err = db
            .sales()
            .create_sale(&NewSale::cash(vec![line(9999, 1)]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Rejected(CoreError::ProductNotFound(9999))
        ));
    }

    #[tokio::test]
    async fn test_non_positive_quantity_is_invalid() {
        let db = test_db().await;
        let product = seed_product(&db, "Roti", 12_000, 5).await;
        let err = db
            .sales()
            .create_sale(&NewSale::cash(vec![line(product.id, 1), line(product.id, 0)]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Rejected(CoreError::Validation(
                ValidationError::MustBePositive { .. }
            ))
        ));
        assert_eq!(stock_of(&db, product.id).await, 5);
    }

    #[tokio::test]
    async fn test_failure_rolls_back_earlier_lines() {
        let db = test_db().await;
        let kopi = seed_product(&db, "Kopi Sachet", 1_500, 10).await;
        let gula = seed_product(&db, "Gula 1kg", 15_000, 1).await;

        let err = db
            .sales()
            .create_sale(&NewSale::cash(vec![line(kopi.id, 4), line(gula.id, 2)]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Rejected(CoreError::InsufficientStock { .. })
        ));

        assert_eq!(stock_of(&db, kopi.id).await, 10);
        assert_eq!(stock_of(&db, gula.id).await, 1);
        assert_eq!(db.sales().count().await.unwrap(), 0);
        let items: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sale_items")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(items, 0);
    }

    #[tokio::test]
    async fn test_missing_product_wins_over_earlier_shortfall() {
        let db = test_db().await;
        let teh = seed_product(&db, "Teh Celup", 6_000, 1).await;

        let err = db
            .sales()
            .create_sale(&NewSale::cash(vec![line(teh.id, 5), line(4242, 1)]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Rejected(CoreError::ProductNotFound(4242))
        ));
    }

    #[tokio::test]
    async fn test_total_is_sum_of_subtotals() {
        let db = test_db().await;
        let a = seed_product(&db, "Beras 5kg", 75_000, 3).await;
        let b = seed_product(&db, "Telur 1kg", 28_000, 3).await;
        let c = seed_product(&db, "Kecap Manis", 9_500, 3).await;

        let sale = db
            .sales()
            .create_sale(&NewSale::cash(vec![line(a.id, 1), line(b.id, 2), line(c.id, 3)]))
            .await
            .unwrap();

        let sum: i64 = sale
            .items
            .iter()
            .map(|item| item.unit_price * item.quantity)
            .sum();
        assert_eq!(sale.sale.total_amount, sum);
        assert_eq!(sale.sale.total_amount, 75_000 + 56_000 + 28_500);

        // cart order is preserved
        let ids: Vec<_> = sale.items.iter().map(|item| item.product_id).collect();
        assert_eq!(ids, [a.id, b.id, c.id]);

        let stored = db.sales().get(sale.sale.id).await.unwrap();
        assert_eq!(stored, sale);
    }

    #[tokio::test]
    async fn test_unit_price_is_a_snapshot() {
        let db = test_db().await;
        let product = seed_product(&db, "Susu UHT", 6_500, 10).await;

        let sale = db
            .sales()
            .create_sale(&NewSale::cash(vec![line(product.id, 2)]))
            .await
            .unwrap();

        db.products()
            .update(
                product.id,
                &ProductPatch {
                    price: Some(9_999),
                    name: Some("Susu UHT Full Cream".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        db.products().delete(product.id).await.unwrap();

        let stored = db.sales().get(sale.sale.id).await.unwrap();
        assert_eq!(stored.items[0].unit_price, 6_500);
        assert_eq!(stored.items[0].product_name, "Susu UHT");
        assert_eq!(stored.sale.total_amount, 13_000);
    }

    #[tokio::test]
    async fn test_customer_and_payment_method_are_stored() {
        let db = test_db().await;
        let product = seed_product(&db, "Pulsa 10k", 11_000, 50).await;

        let anonymous = db
            .sales()
            .create_sale(&NewSale {
                customer_id: Some(0),
                items: vec![line(product.id, 1)],
                payment_method: PaymentMethod::EWallet,
                notes: Some("QRIS".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(anonymous.sale.customer_id, None);
        assert_eq!(anonymous.sale.payment_method, PaymentMethod::EWallet);
        assert_eq!(anonymous.sale.notes.as_deref(), Some("QRIS"));

        let known = db
            .sales()
            .create_sale(&NewSale {
                customer_id: Some(7),
                items: vec![line(product.id, 1)],
                payment_method: PaymentMethod::Transfer,
                notes: None,
            })
            .await
            .unwrap();
        assert_eq!(known.sale.customer_id, Some(7));

        let filtered = db
            .sales()
            .list(&SalesFilter {
                customer_id: Some(7),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].sale.id, known.sale.id);
        assert_eq!(filtered[0].items.len(), 1);
    }

    #[tokio::test]
    async fn test_list_newest_first_and_status_filter() {
        let db = test_db().await;
        let product = seed_product(&db, "Rokok", 30_000, 10).await;

        let first = db
            .sales()
            .create_sale(&NewSale::cash(vec![line(product.id, 1)]))
            .await
            .unwrap();
        let second = db
            .sales()
            .create_sale(&NewSale::cash(vec![line(product.id, 2)]))
            .await
            .unwrap();

        let all = db.sales().list(&SalesFilter::default()).await.unwrap();
        let ids: Vec<_> = all.iter().map(|s| s.sale.id).collect();
        assert_eq!(ids, [second.sale.id, first.sale.id]);

        db.sales()
            .update(
                first.sale.id,
                &SaleUpdate {
                    status: Some(SaleStatus::Cancelled),
                    notes: None,
                },
            )
            .await
            .unwrap();

        let cancelled = db
            .sales()
            .list(&SalesFilter {
                status: Some(SaleStatus::Cancelled),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(cancelled.len(), 1);
        assert_eq!(cancelled[0].sale.id, first.sale.id);

        // cancelling does not restock
        assert_eq!(stock_of(&db, product.id).await, 7);
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_sale() {
        let db = test_db().await;
        assert!(matches!(
            db.sales().update(404, &SaleUpdate::default()).await,
            Err(DbError::NotFound { .. })
        ));
        assert!(matches!(
            db.sales().delete(404).await,
            Err(DbError::NotFound { .. })
        ));
        assert!(matches!(
            db.sales().get(404).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_removes_items_without_restocking() {
        let db = test_db().await;
        let product = seed_product(&db, "Minyak 2L", 34_000, 4).await;
        let sale = db
            .sales()
            .create_sale(&NewSale::cash(vec![line(product.id, 3)]))
            .await
            .unwrap();

        db.sales().delete(sale.sale.id).await.unwrap();

        assert_eq!(db.sales().count().await.unwrap(), 0);
        let items: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sale_items")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(items, 0);
        assert_eq!(stock_of(&db, product.id).await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_checkouts_never_oversell() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(DbConfig::new(dir.path().join("warung.db")).max_connections(8))
            .await
            .unwrap();
        let product = seed_product(&db, "Es Teh", 3_000, 10).await;

        let mut handles = Vec::new();
        for _ in 0..20 {
            let sales = db.sales();
            let product_id = product.id;
            handles.push(tokio::spawn(async move {
                sales
                    .create_sale(&NewSale::cash(vec![line(product_id, 1)]))
                    .await
            }));
        }

        let mut succeeded = 0;
        let mut rejected = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => succeeded += 1,
                Err(CheckoutError::Rejected(CoreError::InsufficientStock { .. })) => rejected += 1,
                Err(other) => panic!("unexpected checkout error: {other:?}"),
            }
        }

        assert_eq!(succeeded, 10);
        assert_eq!(rejected, 10);
        assert_eq!(stock_of(&db, product.id).await, 0);
        assert_eq!(db.sales().count().await.unwrap(), 10);
    }
}
